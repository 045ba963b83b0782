//! Functions to generate random sequences
use crate::error::{BocpdError, Result};
use rand::Rng;
use rv::dist::Gaussian;
use rv::traits::Rv;

fn gaussian(mu: f64, sigma: f64) -> Result<Gaussian> {
    Gaussian::new(mu, sigma).map_err(|err| {
        BocpdError::invalid(format!("N({mu}, {sigma}): {err:?}"))
    })
}

/// Generate a series of draws from two Gaussian process that switches
/// at `switch` into the sequence.
///
/// # Example
/// ```rust
/// use bocpd::generators::discontinuous_jump;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// let mut rng: StdRng = StdRng::seed_from_u64(0x12345);
/// // Generate 1000 numbers from two Gaussians, G(0, 1) and G(10, 5),
/// // switching from the first to the second at 500 steps.
/// let seq: Vec<f64> = discontinuous_jump(
///     &mut rng,
///     0.0,
///     1.0,
///     10.0,
///     5.0,
///     500,
///     1000
/// ).unwrap();
/// assert_eq!(seq.len(), 1000);
/// ```
///
/// # Errors
/// `InvalidParameter` for an invalid Gaussian or `switch > size`.
pub fn discontinuous_jump<R: Rng>(
    rng: &mut R,
    mu_1: f64,
    sigma_1: f64,
    mu_2: f64,
    sigma_2: f64,
    switch: usize,
    size: usize,
) -> Result<Vec<f64>> {
    if switch > size {
        return Err(BocpdError::invalid(format!(
            "switch {switch} is past the end of a sequence of {size}"
        )));
    }
    let g1 = gaussian(mu_1, sigma_1)?;
    let g2 = gaussian(mu_2, sigma_2)?;
    let mut seq: Vec<f64> = g1.sample(switch, rng);
    let tail: Vec<f64> = g2.sample(size - switch, rng);
    seq.extend(tail);
    Ok(seq)
}

/// Concatenate Gaussian segments with the given lengths, means and standard
/// deviations.
///
/// # Errors
/// `DimensionMismatch` if the three slices differ in length,
/// `InvalidParameter` for an invalid Gaussian.
pub fn piecewise_normal<R: Rng>(
    lengths: &[usize],
    means: &[f64],
    stds: &[f64],
    rng: &mut R,
) -> Result<Vec<f64>> {
    for other in [means.len(), stds.len()] {
        if other != lengths.len() {
            return Err(BocpdError::DimensionMismatch {
                expected: lengths.len(),
                got: other,
            });
        }
    }
    let mut data = Vec::with_capacity(lengths.iter().sum());
    for ((&n, &mu), &sigma) in lengths.iter().zip(means).zip(stds) {
        let draws: Vec<f64> = gaussian(mu, sigma)?.sample(n, rng);
        data.extend(draws);
    }
    Ok(data)
}

/// Random piecewise-stationary Gaussian series.
///
/// Draws `num` segment lengths uniformly from `min_len..max_len`; each
/// segment gets a mean from N(0, 10²) and a standard deviation |N(0, 1)|.
/// Returns the segment lengths along with the series, whose length is their
/// sum.
///
/// # Errors
/// `InvalidParameter` if `min_len >= max_len`.
pub fn normal_segments<R: Rng>(
    num: usize,
    min_len: usize,
    max_len: usize,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<f64>)> {
    if min_len >= max_len {
        return Err(BocpdError::invalid(format!(
            "segment length range {min_len}..{max_len} is empty"
        )));
    }
    let std_normal = gaussian(0.0, 1.0)?;
    let lengths: Vec<usize> =
        (0..num).map(|_| rng.gen_range(min_len..max_len)).collect();

    let mut means = Vec::with_capacity(num);
    let mut stds = Vec::with_capacity(num);
    for _ in 0..num {
        let m: f64 = std_normal.draw(rng);
        let s: f64 = std_normal.draw(rng);
        means.push(m * 10.0);
        // guard against a zero draw
        stds.push(s.abs().max(f64::MIN_POSITIVE));
    }

    let data = piecewise_normal(&lengths, &means, &stds, rng)?;
    Ok((lengths, data))
}
