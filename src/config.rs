use std::time::Duration;

/// Solver configuration.
///
/// Handed to [`Problem::new`][crate::problem::Problem::new] and fixed for the
/// lifetime of the problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Convergence tolerance on the objective.
    pub precision: f64,

    /// Interpret `precision` relative to the incumbent value instead of as an
    /// absolute gap.
    pub relative_tolerance: bool,

    /// Skip box reduction against constraints and the incumbent.
    pub disable_reduction: bool,

    /// Emit a progress report every this many iterations.
    pub report_interval: usize,

    /// Raise progress reports from `debug` to `info`.
    pub console_output: bool,

    /// Stop with [`Status::Unsolved`][crate::solver::Status::Unsolved] after
    /// this many iterations.
    pub max_iterations: Option<usize>,

    /// Stop with [`Status::Unsolved`][crate::solver::Status::Unsolved] after
    /// this much wall-clock time.
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: 1e-2,
            relative_tolerance: false,
            disable_reduction: true,
            report_interval: 1_000_000,
            console_output: false,
            max_iterations: None,
            time_limit: None,
        }
    }
}

impl Config {
    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns a reason if `precision` is not finite and positive or
    /// `report_interval` is zero.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err("precision must be finite and positive");
        }
        if self.report_interval == 0 {
            return Err("report_interval must be positive");
        }
        Ok(())
    }

    /// Allowed gap between a box bound and the incumbent value `best`.
    pub fn tolerance(&self, best: f64) -> f64 {
        if self.relative_tolerance && best.is_finite() {
            self.precision * best.abs()
        } else {
            self.precision
        }
    }
}
