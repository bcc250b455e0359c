//! Box reduction.
//!
//! Before a box is queued its ends are trimmed: along every coordinate the
//! lower or upper half is cut away as long as that half provably contains no
//! feasible point, or its objective bound does not exceed the threshold.

use log::trace;

use crate::problem::{Problem, Scratch};
use crate::region::Region;

/// Halvings attempted per coordinate and end.
const MAX_CUTS: usize = 8;

/// Whether no point of `region` can be feasible and better than `threshold`.
fn is_dead(problem: &Problem, scratch: &mut Scratch, region: &Region, threshold: f64) -> bool {
    if let Ok(true) = problem.excludes(scratch, region) {
        return true;
    }
    matches!(problem.bound(scratch, region), Ok(b) if b <= threshold)
}

/// Shrink `region`, or return `None` if all of it can be discarded.
pub fn reduce(
    problem: &Problem,
    scratch: &mut Scratch,
    mut region: Region,
    threshold: f64,
) -> Option<Region> {
    for i in 0..region.dim() {
        for _ in 0..MAX_CUTS {
            let Some((low, high)) = region.split_at(i) else {
                break;
            };
            let low_dead = is_dead(problem, scratch, &low, threshold);
            let high_dead = is_dead(problem, scratch, &high, threshold);
            region = match (low_dead, high_dead) {
                (true, true) => {
                    trace!("reduce: {} eliminated", region);
                    return None;
                }
                (true, false) => high,
                (false, true) => low,
                (false, false) => break,
            };
        }
    }
    Some(region)
}
