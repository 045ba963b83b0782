//! Hazard functions.
//!
//! A hazard maps a timescale `lam` and a shape hint to one changepoint
//! probability per run-length hypothesis; entry `i` is the prior probability
//! that a run of length `i` ends at this step.

use crate::error::{BocpdError, Result};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// How many hazard values to produce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeHint<'a> {
    /// An explicit number of rows, as used by the batch recursion.
    Rows(usize),
    /// A vector whose length is reused, as used by the streaming recursion
    /// (which passes its predictive probabilities).
    Like(&'a [f64]),
}

impl ShapeHint<'_> {
    /// Number of hazard values requested.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(n) => *n,
            Self::Like(xs) => xs.len(),
        }
    }

    /// Whether zero values are requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pluggable hazard policy.
///
/// Every returned entry must be a probability in `[0, 1]`; the detectors
/// reject anything else with `InvalidParameter`.
pub trait Hazard {
    /// Evaluate the hazard for every hypothesis described by `hint`.
    ///
    /// # Errors
    /// Implementations return `InvalidParameter` when `lam` (or their own
    /// parameters) cannot produce probabilities.
    fn hazard(&self, lam: f64, hint: ShapeHint<'_>) -> Result<Vec<f64>>;

    /// Reject a timescale up front, before any observation is seen.
    /// Hazards that ignore `lam` accept everything.
    ///
    /// # Errors
    /// `InvalidParameter` if this hazard cannot use `lam`.
    fn check_lambda(&self, _lam: f64) -> Result<()> {
        Ok(())
    }
}

impl<F> Hazard for F
where
    F: Fn(f64, ShapeHint<'_>) -> Result<Vec<f64>>,
{
    fn hazard(&self, lam: f64, hint: ShapeHint<'_>) -> Result<Vec<f64>> {
        self(lam, hint)
    }
}

/// Check that `lam` can be used as a geometric timescale.
///
/// # Errors
/// `InvalidParameter` if `lam` is not a positive finite number.
pub fn validate_lambda(lam: f64) -> Result<()> {
    if lam.is_finite() && lam > 0.0 {
        Ok(())
    } else {
        Err(BocpdError::invalid(format!(
            "hazard lambda must be positive and finite, got {lam}"
        )))
    }
}

/// A constant hazard function.
/// This is the hazard function that corresponds to a geometric distribution
/// with timescale λ: every run length ends with probability `1/λ`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ConstantHazard;

impl Hazard for ConstantHazard {
    fn hazard(&self, lam: f64, hint: ShapeHint<'_>) -> Result<Vec<f64>> {
        constant_hazard(lam, hint)
    }

    fn check_lambda(&self, lam: f64) -> Result<()> {
        validate_lambda(lam)
    }
}

/// Free-function form of [`ConstantHazard`].
///
/// # Errors
/// `InvalidParameter` if `lam` is not positive and finite.
pub fn constant_hazard(lam: f64, hint: ShapeHint<'_>) -> Result<Vec<f64>> {
    validate_lambda(lam)?;
    Ok(vec![lam.recip(); hint.len()])
}

/// Logistic Hazard parameters
///
/// LH(r, h, a, b) = logistic(h) * logistic(a * r + b)
///
/// Unlike [`ConstantHazard`] this depends on the run length `r` and ignores
/// `lam`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[must_use]
pub struct LogisticHazard {
    /// Logit scaled, scaling factor for the whole curve.
    h: f64,
    /// Slope of the logistic in run length.
    a: f64,
    /// Translation term (increasing moves the logistic to the left).
    b: f64,
}

impl LogisticHazard {
    /// Create a new `LogisticHazard`
    ///
    /// # Errors
    /// `InvalidParameter` if any parameter is not finite.
    pub fn new(h: f64, a: f64, b: f64) -> Result<Self> {
        if [h, a, b].iter().all(|p| p.is_finite()) {
            Ok(Self { h, a, b })
        } else {
            Err(BocpdError::invalid(format!(
                "logistic hazard parameters must be finite, \
                 got ({h}, {a}, {b})"
            )))
        }
    }

    /// Hazard at run length `r`.
    #[must_use]
    pub fn compute(&self, r: f64) -> f64 {
        logistic(self.h) * logistic(self.a.mul_add(r, self.b))
    }
}

impl Hazard for LogisticHazard {
    fn hazard(&self, _lam: f64, hint: ShapeHint<'_>) -> Result<Vec<f64>> {
        Ok((0..hint.len()).map(|r| self.compute(r as f64)).collect())
    }
}

/// Check that every hazard value is a finite probability.
pub(crate) fn check_probabilities(hs: &[f64]) -> Result<()> {
    match hs.iter().find(|h| !(0.0..=1.0).contains(*h)) {
        None => Ok(()),
        Some(h) => Err(BocpdError::invalid(format!(
            "hazard values must lie in [0, 1], got {h}"
        ))),
    }
}

#[inline]
fn logistic(x: f64) -> f64 {
    (1.0 + (-x).exp()).recip()
}
