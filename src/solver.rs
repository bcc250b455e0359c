//! Branch-and-bound over boxes.
//!
//! The search maximizes the objective. Each open box carries an upper bound of
//! the objective on it, obtained from the mixed monotonic form as
//! `F(upper, lower)`. Boxes are expanded best-bound-first; a box is dropped as
//! soon as its bound can not beat the incumbent by more than the tolerance, or
//! some constraint is violated everywhere on it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use log::{debug, info, log, trace, Level};

use crate::problem::{Problem, Scratch};
use crate::reduce;
use crate::region::Region;

/// Outcome of an [`optimize`][Problem::optimize] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Stopped by the iteration or time budget.
    Unsolved,
    /// Every box was resolved and a feasible point was found.
    Optimal,
    /// Every box was resolved and none contains a feasible point.
    Infeasible,
    /// The best remaining bound is within tolerance of the incumbent.
    ToleranceReached,
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: Status,

    /// Best feasible objective value, `-inf` without a witness.
    pub value: f64,

    /// Feasible point achieving `value`.
    pub point: Option<Vec<f64>>,

    /// Largest bound among the boxes still open when the search stopped.
    pub bound: f64,

    /// Number of boxes expanded.
    pub iterations: usize,

    /// Iteration at which the incumbent was last improved.
    pub last_update: usize,

    pub elapsed: Duration,
}

/// Open box with its objective bound.
#[derive(Debug)]
struct Entry {
    bound: f64,
    seq: u64,
    region: Region,
}

impl Entry {
    fn key(&self) -> (f64, Reverse<u64>) {
        (self.bound, Reverse(self.seq))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.key(), other.key());
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
    }
}

struct Solver<'a> {
    problem: &'a Problem,
    scratch: Scratch,
    queue: BinaryHeap<Entry>,
    seq: u64,
    best_value: f64,
    best_point: Option<Vec<f64>>,
    iterations: usize,
    last_update: usize,
    start: Instant,
}

impl Problem {
    /// Maximize the objective.
    pub fn optimize(&self) -> Solution {
        Solver::new(self).run()
    }
}

impl<'a> Solver<'a> {
    fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            scratch: problem.scratch(),
            queue: BinaryHeap::new(),
            seq: 0,
            best_value: f64::NEG_INFINITY,
            best_point: None,
            iterations: 0,
            last_update: 0,
            start: Instant::now(),
        }
    }

    fn threshold(&self) -> f64 {
        self.best_value + self.problem.config().tolerance(self.best_value)
    }

    fn run(mut self) -> Solution {
        let config = *self.problem.config();
        info!(
            "optimize: dim = {}, constraints = {}, precision = {} ({})",
            self.problem.dim(),
            self.problem.constraints().count(),
            config.precision,
            if config.relative_tolerance { "relative" } else { "absolute" }
        );

        self.process(self.problem.domain().clone(), f64::INFINITY);

        let status = loop {
            if config.max_iterations.is_some_and(|n| self.iterations >= n) {
                break Status::Unsolved;
            }
            if config.time_limit.is_some_and(|t| self.start.elapsed() >= t) {
                break Status::Unsolved;
            }

            let Some(entry) = self.queue.pop() else {
                break if self.best_point.is_some() {
                    Status::Optimal
                } else {
                    Status::Infeasible
                };
            };

            if entry.bound <= self.threshold() {
                if self.best_point.is_some() {
                    self.queue.push(entry);
                    break Status::ToleranceReached;
                }
                continue;
            }

            self.iterations += 1;
            if self.iterations % config.report_interval == 0 {
                let level = if config.console_output { Level::Info } else { Level::Debug };
                log!(
                    level,
                    "iteration {}: best = {}, bound = {}, open = {}, elapsed = {:?}",
                    self.iterations,
                    self.best_value,
                    entry.bound,
                    self.queue.len() + 1,
                    self.start.elapsed()
                );
            }

            match entry.region.split() {
                Some((a, b)) => {
                    self.process(a, entry.bound);
                    self.process(b, entry.bound);
                }
                None => trace!("{} can not be split, dropped", entry.region),
            }
        };

        let bound = self
            .queue
            .peek()
            .map_or(self.best_value, |e| e.bound.max(self.best_value));
        let solution = Solution {
            status,
            value: self.best_value,
            point: self.best_point,
            bound,
            iterations: self.iterations,
            last_update: self.last_update,
            elapsed: self.start.elapsed(),
        };
        info!(
            "optimize finished: {:?}, value = {}, bound = {}, iterations = {} (last update at {}), elapsed = {:?}",
            solution.status,
            solution.value,
            solution.bound,
            solution.iterations,
            solution.last_update,
            solution.elapsed
        );
        solution
    }

    /// Bound a new box, try its center as a candidate and queue it if it may
    /// still contain a better point.
    fn process(&mut self, region: Region, inherited: f64) {
        let point = region.is_point();

        let bound = match self.problem.bound(&mut self.scratch, &region) {
            Ok(b) if !b.is_nan() => b.min(inherited),
            Ok(_) if point => return,
            Ok(_) => inherited,
            Err(e) if point => {
                trace!("{} discarded: {}", region, e);
                return;
            }
            Err(e) => {
                trace!("{} deferred: {}", region, e);
                inherited
            }
        };

        match self.problem.excludes(&mut self.scratch, &region) {
            Ok(true) => {
                trace!("{} infeasible", region);
                return;
            }
            Ok(false) => {}
            Err(e) if point => {
                trace!("{} discarded: {}", region, e);
                return;
            }
            Err(_) => {}
        }

        self.try_candidate(region.center());

        if point || bound <= self.threshold() {
            return;
        }

        let region = if self.problem.config().disable_reduction {
            region
        } else {
            let threshold = self.threshold();
            match reduce::reduce(self.problem, &mut self.scratch, region, threshold) {
                Some(r) => r,
                None => return,
            }
        };

        self.queue.push(Entry {
            bound,
            seq: self.seq,
            region,
        });
        self.seq += 1;
    }

    fn try_candidate(&mut self, point: Vec<f64>) {
        let feasible = matches!(self.problem.is_feasible(&mut self.scratch, &point), Ok(true));
        if !feasible {
            return;
        }
        if let Ok(value) = self.problem.value(&mut self.scratch, &point) {
            if value > self.best_value {
                debug!(
                    "iteration {}: new incumbent {} at {:?}",
                    self.iterations, value, point
                );
                self.best_value = value;
                self.best_point = Some(point);
                self.last_update = self.iterations;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use test_log::test;

    use crate::config::Config;
    use crate::constraint::Relation;
    use crate::session::Session;

    #[test]
    fn test_entry_order() {
        let region = Region::new(vec![0.0], vec![1.0]);
        let mut heap = BinaryHeap::new();
        for (seq, bound) in [(0, 1.0), (1, 3.0), (2, 3.0), (3, -1.0)] {
            heap.push(Entry {
                bound,
                seq,
                region: region.clone(),
            });
        }
        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|e| e.seq)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_linear_objective() {
        // max x0 - x1 over [0, 1]^2: optimum 1 at (1, 0).
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let m = s.matrix(1, 2, &[1.0, -1.0]).unwrap();
        let f = s.apply_sum(s.apply_matvec(m, x).unwrap()).unwrap();
        let p = Problem::new(&s, f, x, &[], Config::default()).unwrap();

        let sol = p.optimize();
        assert!(matches!(sol.status, Status::Optimal | Status::ToleranceReached));
        assert_abs_diff_eq!(sol.value, 1.0, epsilon = 1e-2);
        assert!(sol.bound >= sol.value);
        assert!(sol.bound <= sol.value + 1e-2);
        assert!(sol.last_update <= sol.iterations);
    }

    #[test]
    fn test_point_domain() {
        let s = Session::new();
        let x = s.mk_var(2, &[0.5, 0.25], &[0.5, 0.25]).unwrap();
        let f = s.apply_prod(x).unwrap();
        let p = Problem::new(&s, f, x, &[], Config::default()).unwrap();

        let sol = p.optimize();
        assert_eq!(sol.status, Status::Optimal);
        assert_eq!(sol.value, 0.125);
        assert_eq!(sol.point, Some(vec![0.5, 0.25]));
        assert_eq!(sol.iterations, 0);
    }

    #[test]
    fn test_infeasible() {
        let s = Session::new();
        let x = s.mk_var(1, &[0.0], &[1.0]).unwrap();
        let two = s.scalar(2.0).unwrap();
        let c = s.constraint(Relation::Ge, x, two).unwrap();
        let f = s.apply_sum(x).unwrap();
        let p = Problem::new(&s, f, x, &[c], Config::default()).unwrap();

        let sol = p.optimize();
        assert_eq!(sol.status, Status::Infeasible);
        assert_eq!(sol.point, None);
        assert_eq!(sol.value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_iteration_budget() {
        let s = Session::new();
        let x = s.mk_var(3, &[0.0], &[1.0]).unwrap();
        let f = s.apply_prod(x).unwrap();
        let config = Config {
            precision: 1e-9,
            max_iterations: Some(10),
            ..Config::default()
        };
        let p = Problem::new(&s, f, x, &[], config).unwrap();

        let sol = p.optimize();
        assert_eq!(sol.status, Status::Unsolved);
        assert_eq!(sol.iterations, 10);
        assert!(sol.point.is_some());
    }

    #[test]
    fn test_time_budget() {
        let s = Session::new();
        let x = s.mk_var(3, &[0.0], &[1.0]).unwrap();
        let f = s.apply_prod(x).unwrap();
        let config = Config {
            precision: 1e-12,
            time_limit: Some(Duration::ZERO),
            ..Config::default()
        };
        let p = Problem::new(&s, f, x, &[], config).unwrap();
        assert_eq!(p.optimize().status, Status::Unsolved);
    }

    #[test]
    fn test_division_by_zero_is_deferred() {
        // max 1/x over [0, 1] s.t. x >= 0.5: boxes touching 0 have no finite
        // bound, yet the search continues below them and finds 2 at x = 0.5.
        let s = Session::new();
        let x = s.mk_var(1, &[0.0], &[1.0]).unwrap();
        let half = s.scalar(0.5).unwrap();
        let c = s.constraint(Relation::Ge, x, half).unwrap();
        let f = s.apply_sum(s.apply_inv(x).unwrap()).unwrap();
        let p = Problem::new(&s, f, x, &[c], Config::default()).unwrap();

        let sol = p.optimize();
        assert!(matches!(sol.status, Status::Optimal | Status::ToleranceReached));
        assert_abs_diff_eq!(sol.value, 2.0, epsilon = 2e-2);
        assert!(sol.point.unwrap()[0] >= 0.5);
    }
}
