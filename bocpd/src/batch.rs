//! Offline run-length recursion over a complete series.
//!
//! Keeps every run-length posterior in a [`RunLengthMatrix`]; O(T²) in both
//! time and memory, so intended for bounded series where the full history is
//! wanted.

use crate::error::{BocpdError, Result};
use crate::hazard::{check_probabilities, Hazard, ShapeHint};
use crate::run_length_matrix::RunLengthMatrix;
use crate::traits::PredictiveModel;
use crate::vecops::{self, argmax};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Result of [`detect_batch`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct BatchOutput {
    /// Run-length posterior after every prefix of the series.
    pub matrix: RunLengthMatrix,
    /// `maxes[t]` is the most likely run length before observation `t` was
    /// incorporated, i.e. the argmax of column `t`.
    pub maxes: Vec<usize>,
}

/// Run the full BOCPD recursion over `series`.
///
/// `model` must start with a single hypothesis and is advanced once per
/// observation; on success it holds `series.len() + 1` hypotheses.
///
/// # Example
/// ```rust
/// use bocpd::{detect_batch, ConstantHazard, StudentTUpdater};
///
/// let mut model =
///     StudentTUpdater::new(&[0.1], &[0.1], &[1.0], &[0.0]).unwrap();
/// let out =
///     detect_batch(&[0.5, 0.3, 0.8], 250.0, &ConstantHazard, &mut model)
///         .unwrap();
/// assert_eq!(out.maxes.len(), 3);
/// assert_eq!(out.matrix.get(0, 0).unwrap(), 1.0);
/// ```
///
/// # Errors
/// * `InvalidParameter` if the hazard rejects `lam` or returns a value
///   outside `[0, 1]`.
/// * `DimensionMismatch` if the model's hypothesis count does not track
///   the matrix column, or the hazard returns the wrong length.
/// * `Degenerate` if every run length receives zero mass at some step.
pub fn detect_batch<H, P>(
    series: &[f64],
    lam: f64,
    hazard: &H,
    model: &mut P,
) -> Result<BatchOutput>
where
    H: Hazard + ?Sized,
    P: PredictiveModel + ?Sized,
{
    hazard.check_lambda(lam)?;
    let n = series.len();
    tracing::debug!(
        target: "bocpd",
        series_len = n,
        lam,
        "batch detection start"
    );

    let mut matrix = RunLengthMatrix::new(n);
    let mut maxes = Vec::with_capacity(n);

    for (t, &x) in series.iter().enumerate() {
        let prev = matrix.column_range(t, 0..t + 1)?;

        let pred_probs = model.predictive_density(x);
        if pred_probs.len() != t + 1 {
            return Err(BocpdError::DimensionMismatch {
                expected: t + 1,
                got: pred_probs.len(),
            });
        }
        let hs = hazard.hazard(lam, ShapeHint::Rows(t + 1))?;
        check_probabilities(&hs)?;

        let weighted = vecops::mul(&prev, &pred_probs)?;
        let growth = vecops::mul(
            &weighted,
            &vecops::add_constant(&vecops::mul_constant(&hs, -1.0), 1.0),
        )?;
        let cp_mass = vecops::sum(&vecops::mul(&weighted, &hs)?);

        matrix.replace_column_range(t + 1, 1, &growth)?;
        matrix.set(0, t + 1, cp_mass)?;
        matrix.normalize_column(t + 1).map_err(|err| match err {
            BocpdError::Degenerate { .. } => {
                tracing::warn!(
                    target: "bocpd",
                    step = t,
                    "run-length mass degenerated"
                );
                BocpdError::Degenerate { step: t }
            }
            other => other,
        })?;

        model.update(x)?;

        let most_likely = argmax(&prev).unwrap_or(0);
        tracing::trace!(
            target: "bocpd",
            t,
            hypotheses = model.n_hypotheses(),
            cp_mass,
            argmax = most_likely,
            "batch step"
        );
        maxes.push(most_likely);
    }

    tracing::debug!(target: "bocpd", series_len = n, "batch detection done");
    Ok(BatchOutput { matrix, maxes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators;
    use crate::hazard::{constant_hazard, ConstantHazard, LogisticHazard};
    use crate::predictive::StudentTUpdater;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn reference_model() -> StudentTUpdater {
        StudentTUpdater::new(&[0.1], &[0.1], &[1.0], &[0.0]).unwrap()
    }

    #[test]
    fn trivial_series() {
        let mut model = reference_model();
        let out =
            detect_batch(&[0.5, 0.3, 0.8], 250.0, &ConstantHazard, &mut model)
                .unwrap();
        assert_eq!(out.matrix.side(), 4);
        assert_eq!(out.matrix.get(0, 0).unwrap(), 1.0);
        assert_eq!(out.maxes.len(), 3);
        assert_eq!(out.maxes[0], 0);
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn first_step_by_hand() {
        let mut model = reference_model();
        let out =
            detect_batch(&[0.5], 4.0, &ConstantHazard, &mut model).unwrap();
        // With a single hypothesis the predictive density cancels in the
        // normalization, leaving the hazard split.
        let col = out.matrix.distribution(1).unwrap();
        assert::close(col[0], 0.25, 1e-12);
        assert::close(col[1], 0.75, 1e-12);
    }

    #[test]
    fn every_column_is_a_probability_dist() {
        let mut rng = SmallRng::seed_from_u64(0xABCD);
        let data = generators::discontinuous_jump(
            &mut rng, 0.0, 1.0, 10.0, 5.0, 100, 200,
        )
        .unwrap();
        let mut model = StudentTUpdater::default();
        let out =
            detect_batch(&data, 250.0, &constant_hazard, &mut model).unwrap();

        for t in 0..=data.len() {
            let col = out.matrix.distribution(t).unwrap();
            assert::close(col.iter().sum::<f64>(), 1.0, 1e-9);
            assert!(col.iter().all(|&p| p >= 0.0));
            let unused =
                out.matrix.column_range(t, t + 1..data.len() + 1).unwrap();
            assert!(unused.iter().all(|&p| p == 0.0));
        }
        assert_eq!(model.len(), data.len() + 1);
    }

    #[test]
    fn detect_obvious_switch() {
        let mut rng = SmallRng::seed_from_u64(0xABCD);
        let data = generators::discontinuous_jump(
            &mut rng, 0.0, 1.0, 20.0, 1.0, 100, 150,
        )
        .unwrap();
        let mut model = StudentTUpdater::default();
        let out =
            detect_batch(&data, 250.0, &ConstantHazard, &mut model).unwrap();

        let change_points = out.matrix.map_changepoints();
        assert_eq!(change_points.first(), Some(&0));
        assert!(change_points.iter().any(|&cp| (99..=101).contains(&cp)));
        // maxes[t] reads column t, which has not seen observation t yet
        assert!(out.maxes[99] > 50);
        assert!(out.maxes[100] > 50);
        assert_eq!(out.maxes[101], 1);
        assert!(out.maxes[149] > 40);
    }

    #[test]
    fn empty_series() {
        let mut model = reference_model();
        let out =
            detect_batch(&[], 250.0, &ConstantHazard, &mut model).unwrap();
        assert_eq!(out.matrix.side(), 1);
        assert!(out.maxes.is_empty());
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn invalid_lambda() {
        let mut model = reference_model();
        assert!(matches!(
            detect_batch(&[1.0], 0.0, &ConstantHazard, &mut model),
            Err(BocpdError::InvalidParameter(_))
        ));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn hazard_above_one_is_rejected() {
        let mut model = reference_model();
        let res = detect_batch(
            &[0.5, 0.3, 0.8, 4.0, 4.2],
            0.5,
            &ConstantHazard,
            &mut model,
        );
        assert!(matches!(res, Err(BocpdError::InvalidParameter(_))));
        assert_eq!(model, reference_model());
    }

    #[test]
    fn lambda_is_ignored_by_logistic_hazard() {
        let hazard = LogisticHazard::new(-5.0, 0.1, -2.0).unwrap();
        let mut model = reference_model();
        let out = detect_batch(&[0.5, 0.3, 0.8], 0.0, &hazard, &mut model)
            .unwrap();
        assert_eq!(out.maxes.len(), 3);
        let col = out.matrix.distribution(3).unwrap();
        assert::close(col.iter().sum::<f64>(), 1.0, 1e-9);
    }

    #[test]
    fn multiple_initial_hypotheses_are_rejected() {
        let mut model = StudentTUpdater::new(
            &[0.1, 0.1],
            &[0.1, 0.1],
            &[1.0, 1.0],
            &[0.0, 0.0],
        )
        .unwrap();
        assert!(matches!(
            detect_batch(&[1.0], 10.0, &ConstantHazard, &mut model),
            Err(BocpdError::DimensionMismatch {
                expected: 1,
                got: 2
            })
        ));
    }

    #[test]
    fn bad_hazard_length() {
        let too_long = |lam: f64, hint: ShapeHint<'_>| -> Result<Vec<f64>> {
            Ok(vec![lam.recip(); hint.len() + 1])
        };
        let mut model = reference_model();
        assert!(matches!(
            detect_batch(&[1.0], 10.0, &too_long, &mut model),
            Err(BocpdError::DimensionMismatch { .. })
        ));
    }
}
