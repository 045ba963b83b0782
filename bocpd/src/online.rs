//! Online Bayesian Change Point Detection
//!
//! This code is derived from
//! "Bayesian Online Changepoint Detection"; Ryan Adams, David `MacKay`;
//! arXiv:0710.3742, which can be found
//! [here](https://arxiv.org/pdf/0710.3742.pdf).
//!
//! Only the current run-length distribution is kept, so memory at step `t`
//! is O(t) and no history needs to be retained.

use crate::error::{BocpdError, Result};
use crate::hazard::{
    check_probabilities, ConstantHazard, Hazard, ShapeHint,
};
use crate::predictive::StudentTUpdater;
use crate::traits::{PredictiveModel, RunLengthDetector};
use crate::vecops::{self, argmax};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Online Bayesian Change Point Detection state container.
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Bocpd<H = ConstantHazard, P = StudentTUpdater> {
    /// Geometric timescale handed to the hazard function.
    lam: f64,
    hazard: H,
    /// Per-hypothesis sufficient statistics and predictive densities.
    model: P,
    /// Run-length probabilities.
    r: Vec<f64>,
    /// Most likely run length after each observation.
    maxes: Vec<usize>,
}

impl<H, P> Bocpd<H, P>
where
    H: Hazard,
    P: PredictiveModel,
{
    /// Create a new Bocpd analyzer
    ///
    /// # Parameters
    /// * `lam` - timescale passed to `hazard`; for [`ConstantHazard`] the
    /// probability of any step being a change-point is `1 / lam`.
    /// * `hazard` - prior probability of a change-point per run length.
    /// * `model` - predictive model, holding exactly one (prior) hypothesis.
    ///
    /// # Example
    /// ```rust
    /// use bocpd::{Bocpd, ConstantHazard, StudentTUpdater};
    ///
    /// let model =
    ///     StudentTUpdater::new(&[0.1], &[0.01], &[1.0], &[0.0]).unwrap();
    /// let mut cpd = Bocpd::new(250.0, ConstantHazard, model).unwrap();
    /// cpd.update(0.5).unwrap();
    /// assert_eq!(cpd.run_length_pr().len(), 2);
    /// ```
    ///
    /// # Errors
    /// * `InvalidParameter` if `hazard` rejects `lam`.
    /// * `DimensionMismatch` if `model` does not start from one hypothesis.
    pub fn new(lam: f64, hazard: H, model: P) -> Result<Self> {
        hazard.check_lambda(lam)?;
        if model.n_hypotheses() != 1 {
            return Err(BocpdError::DimensionMismatch {
                expected: 1,
                got: model.n_hypotheses(),
            });
        }
        tracing::debug!(target: "bocpd", lam, "created online detector");
        Ok(Self {
            lam,
            hazard,
            model,
            r: vec![1.0],
            maxes: Vec::new(),
        })
    }

    /// Incorporate one observation.
    ///
    /// # Errors
    /// * `DimensionMismatch` if the model or hazard return vectors that do
    ///   not match the current run-length distribution.
    /// * `InvalidParameter` if the hazard rejects `lam` or returns a value
    ///   outside `[0, 1]`.
    /// * `Degenerate` if no run length retains any mass.
    ///
    /// On error the detector state is unchanged.
    pub fn update(&mut self, x: f64) -> Result<&[f64]> {
        let pred_probs = self.model.predictive_density(x);
        let hs = self.hazard.hazard(self.lam, ShapeHint::Like(&pred_probs))?;
        check_probabilities(&hs)?;

        let weighted = vecops::mul(&self.r, &pred_probs)?;
        let growth = vecops::mul(
            &weighted,
            &vecops::add_constant(&vecops::mul_constant(&hs, -1.0), 1.0),
        )?;
        let cp_mass = vecops::sum(&vecops::mul(&weighted, &hs)?);

        let mut next = vecops::concat(&[cp_mass], &growth);
        vecops::normalize(&mut next).map_err(|_| {
            tracing::warn!(
                target: "bocpd",
                step = self.t(),
                "run-length mass degenerated"
            );
            BocpdError::Degenerate { step: self.t() }
        })?;

        self.model.update(x)?;
        self.r = next;

        let most_likely = argmax(&self.r).unwrap_or(0);
        tracing::trace!(
            target: "bocpd",
            t = self.maxes.len(),
            hypotheses = self.model.n_hypotheses(),
            cp_mass,
            argmax = most_likely,
            "online step"
        );
        self.maxes.push(most_likely);
        Ok(&self.r)
    }

    /// Current run-length distribution; entry `s` is the probability that
    /// the current run has lasted `s` steps.
    #[must_use]
    pub fn run_length_pr(&self) -> &[f64] {
        &self.r
    }

    /// Most likely run length after each observation so far.
    #[must_use]
    pub fn maxes(&self) -> &[usize] {
        &self.maxes
    }

    /// Number of observations processed.
    #[must_use]
    pub fn t(&self) -> usize {
        self.maxes.len()
    }

    /// The hazard timescale.
    #[must_use]
    pub fn lam(&self) -> f64 {
        self.lam
    }

    /// The predictive model.
    #[must_use]
    pub fn model(&self) -> &P {
        &self.model
    }

    /// The hazard function.
    #[must_use]
    pub fn hazard(&self) -> &H {
        &self.hazard
    }

    /// Most likely current run length.
    #[must_use]
    pub fn most_likely_run_length(&self) -> usize {
        self.maxes.last().copied().unwrap_or(0)
    }

    /// Posterior probability that a run started at the latest step.
    #[must_use]
    pub fn changepoint_probability(&self) -> f64 {
        self.r[0]
    }

    /// Density of `x` as the next observation, mixing the predictive of every
    /// run length by its current probability.
    ///
    /// # Errors
    /// `DimensionMismatch` if the model and run-length distribution disagree.
    pub fn posterior_predictive(&self, x: f64) -> Result<f64> {
        let pred_probs = self.model.predictive_density(x);
        Ok(vecops::sum(&vecops::mul(&self.r, &pred_probs)?))
    }

    /// Reset the detector and the model to their initial state.
    pub fn reset(&mut self) {
        tracing::debug!(target: "bocpd", t = self.t(), "reset online detector");
        self.model.reset();
        self.r = vec![1.0];
        self.maxes.clear();
    }
}

impl<H, P> RunLengthDetector for Bocpd<H, P>
where
    H: Hazard,
    P: PredictiveModel,
{
    fn step(&mut self, value: f64) -> Result<&[f64]> {
        self.update(value)
    }

    fn run_length_pr(&self) -> &[f64] {
        &self.r
    }

    fn reset(&mut self) {
        Bocpd::reset(self);
    }
}
