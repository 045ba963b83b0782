//! Elementwise operations on equal-length numeric sequences.
//!
//! Every binary operation refuses to combine sequences of different lengths
//! rather than truncating to the shorter one; hypothesis bookkeeping in the
//! recursions relies on exact lengths.

use crate::error::{BocpdError, Result};

fn zip_with<F>(a: &[f64], b: &[f64], f: F) -> Result<Vec<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    if a.len() != b.len() {
        return Err(BocpdError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
}

/// Elementwise `a + b`.
///
/// # Errors
/// `DimensionMismatch` if the lengths differ.
pub fn add(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    zip_with(a, b, |x, y| x + y)
}

/// Elementwise `a - b`.
///
/// # Errors
/// `DimensionMismatch` if the lengths differ.
pub fn sub(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    zip_with(a, b, |x, y| x - y)
}

/// Elementwise `a * b`.
///
/// # Errors
/// `DimensionMismatch` if the lengths differ.
pub fn mul(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    zip_with(a, b, |x, y| x * y)
}

/// Elementwise `a / b`.
///
/// # Errors
/// `DimensionMismatch` if the lengths differ.
pub fn div(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    zip_with(a, b, |x, y| x / y)
}

/// Add `c` to every element.
#[must_use]
pub fn add_constant(xs: &[f64], c: f64) -> Vec<f64> {
    xs.iter().map(|x| x + c).collect()
}

/// Multiply every element by `c`.
#[must_use]
pub fn mul_constant(xs: &[f64], c: f64) -> Vec<f64> {
    xs.iter().map(|x| x * c).collect()
}

/// Raise every element to the power `c`.
#[must_use]
pub fn pow_constant(xs: &[f64], c: f64) -> Vec<f64> {
    xs.iter().map(|x| x.powf(c)).collect()
}

/// Sum of all elements (0 for an empty slice).
#[must_use]
pub fn sum(xs: &[f64]) -> f64 {
    xs.iter().sum()
}

/// Scale `xs` in place so that it sums to one.
///
/// # Errors
/// `Degenerate { step: 0 }` if the sum is zero, negative or not finite; the
/// caller is expected to substitute the real step. `xs` is left unchanged
/// in that case.
pub fn normalize(xs: &mut [f64]) -> Result<()> {
    let z = sum(xs);
    if !z.is_finite() || z <= 0.0 {
        return Err(BocpdError::Degenerate { step: 0 });
    }
    xs.iter_mut().for_each(|x| *x /= z);
    Ok(())
}

/// Index of the first maximum, `None` for an empty slice.
#[must_use]
pub fn argmax(xs: &[f64]) -> Option<usize> {
    rv::misc::argmax(xs).first().copied()
}

/// `head` followed by `tail` in a new vector.
#[must_use]
pub fn concat(head: &[f64], tail: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(head.len() + tail.len());
    out.extend_from_slice(head);
    out.extend_from_slice(tail);
    out
}
