use crate::error::Result;

/// A predictive model tracking one set of sufficient statistics per
/// run-length hypothesis.
///
/// Index 0 always refers to the hypothesis "a run started at the most
/// recent step"; index `i` to a run that has lasted `i` steps.
pub trait PredictiveModel {
    /// Number of active hypotheses.
    fn n_hypotheses(&self) -> usize;
    /// Number of hypotheses present before any observation.
    fn initial_hypotheses(&self) -> usize;
    /// Predictive density of `x` under every active hypothesis.
    fn predictive_density(&self, x: f64) -> Vec<f64>;
    /// Advance every hypothesis by `x` and prepend fresh prior hypotheses.
    ///
    /// # Errors
    /// Returns an error if the model's own bookkeeping is inconsistent.
    fn update(&mut self, x: f64) -> Result<()>;
    /// Drop all observations, returning to the prior.
    fn reset(&mut self);
}

/// Trait for implementors of Bayesian online change-point detection
pub trait RunLengthDetector {
    /// Update the run-length detector and return the new run length
    /// probabilities.
    ///
    /// # Errors
    /// A failed step leaves the detector unchanged.
    fn step(&mut self, value: f64) -> Result<&[f64]>;
    /// Current run length probabilities.
    fn run_length_pr(&self) -> &[f64];
    /// Reset internal state; new run lengths refer to steps after this
    /// point.
    fn reset(&mut self);
}
