use log::debug;

use crate::config::Config;
use crate::constraint::Constraint;
use crate::error::{Error, EvalError};
use crate::eval::{Demand, Program, Workspace};
use crate::node::Node;
use crate::reference::Ref;
use crate::region::Region;
use crate::session::Session;

/// An optimization problem: maximize a scalar objective over the box domain of
/// one variable, subject to constraints.
///
/// The objective and every constraint residual are compiled out of the
/// session at construction, so a problem owns all it needs, does not borrow
/// the session, and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Problem {
    variable: Ref,
    domain: Region,
    objective: Program,
    constraints: Vec<(Constraint, Program)>,
    config: Config,
}

/// Per-solve evaluation buffers for a [`Problem`].
#[derive(Debug, Clone)]
pub struct Scratch {
    objective: Workspace,
    constraints: Vec<Workspace>,
}

impl Problem {
    pub fn new(
        session: &Session,
        objective: Ref,
        variable: Ref,
        constraints: &[Constraint],
        config: Config,
    ) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|reason| Error::InvalidConfig { reason })?;

        session.check(variable)?;
        session.check(objective)?;
        let domain = match session.node(variable) {
            Node::Variable { lower, upper, .. } => Region::new(lower, upper),
            _ => return Err(Error::NotAVariable { node: variable }),
        };

        let node = session.node(objective);
        if node.is_matrix() {
            return Err(Error::MatrixOperand { op: "objective" });
        }
        if node.dim() != 1 {
            return Err(Error::NonScalarObjective { dim: node.dim() });
        }

        let only_variable = |program: &Program| -> Result<(), Error> {
            match program.variables().find(|&v| v != variable) {
                Some(node) => Err(Error::ForeignVariable { node }),
                None => Ok(()),
            }
        };

        let objective = session.compile(objective, Demand::SAME);
        only_variable(&objective)?;

        let constraints = constraints
            .iter()
            .map(|c| {
                session.check(c.residual())?;
                let program = session.compile(c.residual(), Demand::BOTH);
                only_variable(&program)?;
                Ok((*c, program))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        debug!(
            "problem: dim = {}, objective = {} nodes, constraints = {}",
            domain.dim(),
            objective.len(),
            constraints.len()
        );

        Ok(Self {
            variable,
            domain,
            objective,
            constraints,
            config,
        })
    }

    pub fn variable(&self) -> Ref {
        self.variable
    }

    /// Dimension of the optimization variable.
    pub fn dim(&self) -> usize {
        self.domain.dim()
    }

    /// The variable's declared bounds.
    pub fn domain(&self) -> &Region {
        &self.domain
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().map(|(c, _)| c)
    }

    pub fn scratch(&self) -> Scratch {
        Scratch {
            objective: self.objective.workspace(),
            constraints: self.constraints.iter().map(|(_, p)| p.workspace()).collect(),
        }
    }

    /// Upper bound of the objective over `region`: `F(upper, lower)`.
    pub fn bound(&self, scratch: &mut Scratch, region: &Region) -> Result<f64, EvalError> {
        self.objective
            .run(&mut scratch.objective, region.upper(), region.lower())?;
        Ok(self.objective.output(&scratch.objective)[0])
    }

    /// Objective value at `point`.
    pub fn value(&self, scratch: &mut Scratch, point: &[f64]) -> Result<f64, EvalError> {
        self.objective.run(&mut scratch.objective, point, point)?;
        Ok(self.objective.output(&scratch.objective)[0])
    }

    /// Whether some constraint is provably violated everywhere on `region`.
    ///
    /// A constraint whose residual can not be bounded on the region does not
    /// exclude it; the error is reported only if no other constraint does.
    pub fn excludes(&self, scratch: &mut Scratch, region: &Region) -> Result<bool, EvalError> {
        let mut failure = None;
        for ((c, program), ws) in self.constraints.iter().zip(&mut scratch.constraints) {
            match program.run(ws, region.lower(), region.upper()) {
                Ok(()) => {
                    if c.excludes(program.output(ws), program.output_swapped(ws)) {
                        return Ok(true);
                    }
                }
                Err(e) => failure = Some(e),
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(false),
        }
    }

    /// Whether every constraint holds at `point`.
    pub fn is_feasible(&self, scratch: &mut Scratch, point: &[f64]) -> Result<bool, EvalError> {
        for ((c, program), ws) in self.constraints.iter().zip(&mut scratch.constraints) {
            program.run(ws, point, point)?;
            if !c.holds(program.output(ws)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use test_log::test;

    use crate::constraint::Relation;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_problem_is_send_sync() {
        assert_send_sync::<Problem>();
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let f = s.apply_sum(x).unwrap();

        assert_eq!(
            Problem::new(&s, x, x, &[], Config::default()).unwrap_err(),
            Error::NonScalarObjective { dim: 2 }
        );
        assert_eq!(
            Problem::new(&s, f, f, &[], Config::default()).unwrap_err(),
            Error::NotAVariable { node: f }
        );
        let config = Config {
            precision: 0.0,
            ..Config::default()
        };
        assert!(matches!(
            Problem::new(&s, f, x, &[], config),
            Err(Error::InvalidConfig { .. })
        ));

        let y = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let g = s.apply_dot(x, y).unwrap();
        assert_eq!(
            Problem::new(&s, g, x, &[], Config::default()).unwrap_err(),
            Error::ForeignVariable { node: y }
        );
        let c = s.constraint(Relation::Le, y, x).unwrap();
        assert_eq!(
            Problem::new(&s, f, x, &[c], Config::default()).unwrap_err(),
            Error::ForeignVariable { node: y }
        );
    }

    #[test]
    fn test_bound_and_value() {
        // f = x0 - x1 on [0, 1] x [0, 2]
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0, 2.0]).unwrap();
        let m = s.matrix(1, 2, &[1.0, -1.0]).unwrap();
        let f = s.apply_sum(s.apply_matvec(m, x).unwrap()).unwrap();
        let p = Problem::new(&s, f, x, &[], Config::default()).unwrap();
        let mut scratch = p.scratch();

        assert_relative_eq!(p.bound(&mut scratch, p.domain()).unwrap(), 1.0);
        assert_relative_eq!(p.value(&mut scratch, &[0.5, 1.5]).unwrap(), -1.0);

        let point = Region::new(vec![0.25, 0.75], vec![0.25, 0.75]);
        assert_relative_eq!(p.bound(&mut scratch, &point).unwrap(), -0.5);
    }

    #[test]
    fn test_excludes_and_feasible() {
        // x0 + x1 >= 3 on [0, 1]^2 can never hold; x0 <= 0.5 holds on part.
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let f = s.apply_sum(x).unwrap();
        let three = s.scalar(3.0).unwrap();
        let half = s.scalar(0.5).unwrap();
        let x0 = s.apply_index(x, 0).unwrap();
        let never = s.constraint(Relation::Ge, f, three).unwrap();
        let some = s.constraint(Relation::Le, x0, half).unwrap();

        let p = Problem::new(&s, f, x, &[some], Config::default()).unwrap();
        let mut scratch = p.scratch();
        assert!(!p.excludes(&mut scratch, p.domain()).unwrap());
        let right = Region::new(vec![0.6, 0.0], vec![1.0, 1.0]);
        assert!(p.excludes(&mut scratch, &right).unwrap());
        assert!(p.is_feasible(&mut scratch, &[0.5, 0.9]).unwrap());
        assert!(!p.is_feasible(&mut scratch, &[0.6, 0.9]).unwrap());

        let p = Problem::new(&s, f, x, &[some, never], Config::default()).unwrap();
        let mut scratch = p.scratch();
        assert!(p.excludes(&mut scratch, p.domain()).unwrap());
        assert_eq!(p.constraints().count(), 2);
    }
}
