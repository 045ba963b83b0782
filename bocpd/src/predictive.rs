//! Normal-Inverse-Gamma sufficient statistics with a Student-t predictive.
//!
//! Each run-length hypothesis carries its own posterior hyperparameters.
//! The predictive distribution of the next observation under a hypothesis
//! with parameters `(alpha, beta, kappa, mu)` is a Student's t with `2 alpha`
//! degrees of freedom, location `mu` and scale
//! \[
//!     \sqrt{\beta (\kappa + 1) / (\alpha \kappa)}
//! \].

use crate::error::{BocpdError, Result};
use crate::student_t::StudentT;
use crate::traits::PredictiveModel;
use ndarray::Array2;
use rayon::prelude::*;
use rv::prelude::Rv;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Hypothesis counts at or above this are scored and advanced with rayon.
const PAR_THRESHOLD: usize = 2048;

/// Posterior hyperparameters for a single run-length hypothesis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct NigHypothesis {
    /// Inverse-gamma shape
    pub alpha: f64,
    /// Inverse-gamma rate
    pub beta: f64,
    /// Pseudo-observation count on the mean
    pub kappa: f64,
    /// Mean location
    pub mu: f64,
}

impl Default for NigHypothesis {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            kappa: 1.0,
            mu: 0.0,
        }
    }
}

impl NigHypothesis {
    /// Create a new hypothesis, checking that `alpha`, `beta` and `kappa`
    /// are positive and every parameter is finite.
    ///
    /// # Errors
    /// `InvalidParameter` describing the first offending value.
    pub fn new(alpha: f64, beta: f64, kappa: f64, mu: f64) -> Result<Self> {
        let positive = [("alpha", alpha), ("beta", beta), ("kappa", kappa)];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(BocpdError::invalid(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !mu.is_finite() {
            return Err(BocpdError::invalid(format!(
                "mu must be finite, got {mu}"
            )));
        }
        Ok(Self {
            alpha,
            beta,
            kappa,
            mu,
        })
    }

    /// Scale of the Student-t predictive.
    #[must_use]
    pub fn scale(&self) -> f64 {
        (self.beta * (self.kappa + 1.0) / (self.alpha * self.kappa)).sqrt()
    }

    /// The Student-t predictive for the next observation.
    #[must_use]
    pub fn predictive(&self) -> StudentT {
        StudentT::new(self.mu, self.scale(), 2.0 * self.alpha)
    }

    /// Conjugate posterior after observing `x`.
    #[must_use]
    pub fn advance(&self, x: f64) -> Self {
        let kappa_p1 = self.kappa + 1.0;
        let dx = x - self.mu;
        Self {
            alpha: self.alpha + 0.5,
            beta: self.beta + self.kappa * dx * dx / (2.0 * kappa_p1),
            kappa: kappa_p1,
            mu: self.kappa.mul_add(self.mu, x) / kappa_p1,
        }
    }
}

/// Growing set of NIG hypotheses with an immutable prior snapshot.
///
/// After `t` observations there are `t + initial_len()` hypotheses. Every
/// update prepends a fresh copy of the first prior record (the new run) and
/// advances all existing hypotheses by one observation. The remaining prior
/// records only seed the initial hypotheses and [`PredictiveModel::reset`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct StudentTUpdater {
    hypotheses: Vec<NigHypothesis>,
    prior: Vec<NigHypothesis>,
}

impl Default for StudentTUpdater {
    fn default() -> Self {
        Self::from_prior(NigHypothesis::default())
    }
}

impl StudentTUpdater {
    /// Create an updater from parallel prior hyperparameter sequences, one
    /// entry per initial hypothesis. The inputs are copied.
    ///
    /// # Example
    /// ```rust
    /// use bocpd::{PredictiveModel, StudentTUpdater};
    ///
    /// let st = StudentTUpdater::new(&[0.1], &[0.1], &[1.0], &[0.0]).unwrap();
    /// let pdf = st.predictive_density(0.5);
    /// assert!((pdf[0] - 0.10435016543007986).abs() < 1e-11);
    /// ```
    ///
    /// # Errors
    /// * `InvalidParameter` if the sequences are empty or hold an invalid
    ///   hyperparameter.
    /// * `DimensionMismatch` if the sequences differ in length.
    pub fn new(
        alpha0: &[f64],
        beta0: &[f64],
        kappa0: &[f64],
        mu0: &[f64],
    ) -> Result<Self> {
        let n = alpha0.len();
        if n == 0 {
            return Err(BocpdError::invalid(
                "prior hyperparameter vectors must not be empty",
            ));
        }
        for other in [beta0.len(), kappa0.len(), mu0.len()] {
            if other != n {
                return Err(BocpdError::DimensionMismatch {
                    expected: n,
                    got: other,
                });
            }
        }

        let prior = alpha0
            .iter()
            .zip(beta0)
            .zip(kappa0)
            .zip(mu0)
            .map(|(((&a, &b), &k), &m)| NigHypothesis::new(a, b, k, m))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            hypotheses: prior.clone(),
            prior,
        })
    }

    /// Updater with a single initial hypothesis.
    #[must_use]
    pub fn from_prior(prior: NigHypothesis) -> Self {
        Self {
            hypotheses: vec![prior],
            prior: vec![prior],
        }
    }

    /// Number of active hypotheses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    /// Always false; an updater holds at least its prior.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    /// Number of prior hypotheses.
    #[must_use]
    pub fn initial_len(&self) -> usize {
        self.prior.len()
    }

    /// Active hypotheses, newest run first.
    #[must_use]
    pub fn hypotheses(&self) -> &[NigHypothesis] {
        &self.hypotheses
    }

    /// The prior snapshot.
    #[must_use]
    pub fn prior(&self) -> &[NigHypothesis] {
        &self.prior
    }

    /// `alpha` of every active hypothesis.
    #[must_use]
    pub fn alpha(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.alpha).collect()
    }

    /// `beta` of every active hypothesis.
    #[must_use]
    pub fn beta(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.beta).collect()
    }

    /// `kappa` of every active hypothesis.
    #[must_use]
    pub fn kappa(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.kappa).collect()
    }

    /// `mu` of every active hypothesis.
    #[must_use]
    pub fn mu(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.mu).collect()
    }

    /// Log predictive density of `x` under each hypothesis.
    #[must_use]
    pub fn ln_predictive_density(&self, x: f64) -> Vec<f64> {
        let ln_pp = |h: &NigHypothesis| h.predictive().ln_f(&x);
        if self.hypotheses.len() >= PAR_THRESHOLD {
            self.hypotheses.par_iter().map(ln_pp).collect()
        } else {
            self.hypotheses.iter().map(ln_pp).collect()
        }
    }

    /// Predictive densities for several values at once; row `i` holds the
    /// densities under hypothesis `i`, column `j` those of `data[j]`.
    #[must_use]
    pub fn predictive_density_batch(&self, data: &[f64]) -> Array2<f64> {
        Array2::from_shape_fn((self.hypotheses.len(), data.len()), |(i, j)| {
            self.hypotheses[i].predictive().f(&data[j])
        })
    }

    /// Advance every hypothesis with a batch of observations and prepend
    /// the first prior record, growing the set by exactly one.
    ///
    /// Hypothesis `i` is advanced by `data[i]`; when `data` is shorter than
    /// the number of hypotheses its last value is repeated for the rest.
    ///
    /// # Errors
    /// * `InvalidParameter` if `data` is empty.
    /// * `DimensionMismatch` if `data` is longer than the hypothesis count.
    pub fn update_batch(&mut self, data: &[f64]) -> Result<()> {
        let n = self.hypotheses.len();
        let last = data.len().checked_sub(1).ok_or_else(|| {
            BocpdError::invalid("update requires at least one observation")
        })?;
        if data.len() > n {
            return Err(BocpdError::DimensionMismatch {
                expected: n,
                got: data.len(),
            });
        }

        let advance =
            |(i, h): (usize, &NigHypothesis)| h.advance(data[i.min(last)]);
        let advanced: Vec<NigHypothesis> = if n >= PAR_THRESHOLD {
            self.hypotheses.par_iter().enumerate().map(advance).collect()
        } else {
            self.hypotheses.iter().enumerate().map(advance).collect()
        };

        let mut next = Vec::with_capacity(n + 1);
        next.extend(self.prior.first().copied());
        next.extend(advanced);
        self.hypotheses = next;
        Ok(())
    }
}

impl PredictiveModel for StudentTUpdater {
    fn n_hypotheses(&self) -> usize {
        self.len()
    }

    fn initial_hypotheses(&self) -> usize {
        self.initial_len()
    }

    fn predictive_density(&self, x: f64) -> Vec<f64> {
        let pp = |h: &NigHypothesis| h.predictive().f(&x);
        if self.hypotheses.len() >= PAR_THRESHOLD {
            self.hypotheses.par_iter().map(pp).collect()
        } else {
            self.hypotheses.iter().map(pp).collect()
        }
    }

    fn update(&mut self, x: f64) -> Result<()> {
        self.update_batch(&[x])
    }

    fn reset(&mut self) {
        self.hypotheses.clone_from(&self.prior);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> StudentTUpdater {
        StudentTUpdater::new(&[0.1], &[0.1], &[1.0], &[0.0]).unwrap()
    }

    #[test]
    fn known_predictive_density() {
        let st = reference();
        let pdf = st.predictive_density(0.5);
        assert_eq!(pdf.len(), 1);
        assert::close(pdf[0], 0.104_350_165_430_079_86, 1e-11);

        let ln_pdf = st.ln_predictive_density(0.5);
        assert::close(ln_pdf[0].exp(), pdf[0], 1e-14);
    }

    #[test]
    fn batch_density_matches_single() {
        let st = reference();
        let data = [0.5, 0.3, 0.8];
        let m = st.predictive_density_batch(&data);
        assert_eq!(m.dim(), (1, 3));
        for (j, x) in data.iter().enumerate() {
            assert::close(m[(0, j)], st.predictive_density(*x)[0], 1e-15);
        }
        assert::close(m[(0, 0)], 0.104_350_165_430_079_86, 1e-11);
    }

    #[test]
    fn construction_copies_input() {
        let mut alpha = vec![0.1];
        let st = StudentTUpdater::new(&alpha, &[0.1], &[1.0], &[0.0]).unwrap();
        alpha[0] = 0.2;
        assert_eq!(st.alpha(), vec![0.1]);
        assert_eq!(st.prior()[0].alpha, 0.1);
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(
            StudentTUpdater::new(&[], &[], &[], &[]),
            Err(BocpdError::InvalidParameter(_))
        ));
        assert!(matches!(
            StudentTUpdater::new(&[0.1, 0.1], &[0.1], &[1.0, 1.0], &[0.0, 0.0]),
            Err(BocpdError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            StudentTUpdater::new(&[0.1], &[0.0], &[1.0], &[0.0]),
            Err(BocpdError::InvalidParameter(_))
        ));
        assert!(StudentTUpdater::new(&[0.1], &[0.1], &[1.0], &[f64::NAN])
            .is_err());
    }

    #[test]
    fn update_prepends_prior_and_advances() {
        let mut st = reference();
        st.update(0.2).unwrap();
        assert_eq!(st.len(), 2);
        assert_eq!(st.hypotheses()[0], st.prior()[0]);

        let h = st.hypotheses()[1];
        assert::close(h.mu, 0.1, 1e-15);
        assert::close(h.kappa, 2.0, 1e-15);
        assert::close(h.alpha, 0.6, 1e-15);
        // 0.1 + 1 * 0.04 / 4
        assert::close(h.beta, 0.11, 1e-15);

        st.update(0.3).unwrap();
        assert_eq!(st.len(), 3);
        assert_eq!(st.mu().len(), 3);
        assert::close(st.mu()[1], 0.15, 1e-15);
        // (2 * 0.1 + 0.3) / 3
        assert::close(st.mu()[2], 0.5 / 3.0, 1e-15);
        assert_eq!(st.hypotheses()[0], st.prior()[0]);
    }

    fn two_priors() -> StudentTUpdater {
        StudentTUpdater::new(
            &[0.1, 1.0],
            &[0.1, 1.0],
            &[1.0, 2.0],
            &[0.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn hypothesis_count_tracks_observations() {
        let mut st = two_priors();
        assert_eq!(st.initial_hypotheses(), 2);
        for t in 1..=10 {
            st.update(f64::from(t)).unwrap();
            assert_eq!(st.n_hypotheses(), t as usize + 2);
            assert_eq!(st.alpha().len(), st.beta().len());
            assert_eq!(st.kappa().len(), st.mu().len());
        }
        assert_eq!(st.hypotheses()[0], st.prior()[0]);
        assert_eq!(st.prior().len(), 2);
    }

    #[test]
    fn several_priors_grow_by_one_fresh_run() {
        let mut st = two_priors();
        st.update(0.5).unwrap();
        assert_eq!(st.len(), 3);
        assert_eq!(st.hypotheses()[0], st.prior()[0]);
        assert_eq!(st.hypotheses()[1], st.prior()[0].advance(0.5));
        assert_eq!(st.hypotheses()[2], st.prior()[1].advance(0.5));

        st.update_batch(&[1.0, 2.0]).unwrap();
        assert_eq!(st.len(), 4);
        assert_eq!(st.hypotheses()[1], st.prior()[0].advance(1.0));
        assert_eq!(
            st.hypotheses()[3],
            st.prior()[1].advance(0.5).advance(2.0)
        );
    }

    #[test]
    fn short_batches_repeat_last_value() {
        let mut a = StudentTUpdater::new(
            &[0.1, 0.1],
            &[0.1, 0.1],
            &[1.0, 1.0],
            &[0.0, 0.0],
        )
        .unwrap();
        let mut b = a.clone();
        a.update_batch(&[0.7]).unwrap();
        b.update_batch(&[0.7, 0.7]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_batches_are_rejected() {
        let mut st = reference();
        assert!(matches!(
            st.update_batch(&[]),
            Err(BocpdError::InvalidParameter(_))
        ));
        assert!(matches!(
            st.update_batch(&[0.1, 0.2]),
            Err(BocpdError::DimensionMismatch {
                expected: 1,
                got: 2
            })
        ));
        assert_eq!(st, reference());
    }

    #[test]
    fn parallel_path_matches_serial() {
        let mut st = reference();
        for i in 0..(PAR_THRESHOLD + 10) {
            st.update((i % 7) as f64 * 0.1).unwrap();
        }
        let par = st.predictive_density(0.25);
        let serial: Vec<f64> = st
            .hypotheses()
            .iter()
            .map(|h| h.predictive().f(&0.25))
            .collect();
        assert_eq!(par, serial);
    }

    #[test]
    fn reset_restores_prior() {
        let mut st = reference();
        st.update(1.0).unwrap();
        st.update(2.0).unwrap();
        st.reset();
        assert_eq!(st, reference());
    }
}
