//! Square run-length probability buffer used by the batch recursion.

use crate::error::{BocpdError, Result};
use crate::utils::map_changepoints;
use crate::vecops;
use ndarray::{s, Array2};
use std::ops::Range;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Run-length posteriors for a whole series.
///
/// For a series of length `T` this is a `(T + 1) x (T + 1)` matrix whose
/// column `t` is the run-length distribution after `t` observations, stored
/// in rows `0..=t`. Entry `(0, 0)` is 1: before any data the run length is
/// certainly zero.
///
/// ```text
///        t=0  t=1  t=2  t=3
/// r=0  [  1    .    .    . ]
/// r=1  [  0    .    .    . ]
/// r=2  [  0    0    .    . ]
/// r=3  [  0    0    0    . ]
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct RunLengthMatrix {
    r: Array2<f64>,
}

impl RunLengthMatrix {
    /// Allocate a matrix for a series of `series_len` observations.
    #[must_use]
    pub fn new(series_len: usize) -> Self {
        let side = series_len + 1;
        let mut r = Array2::zeros((side, side));
        r[(0, 0)] = 1.0;
        Self { r }
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn side(&self) -> usize {
        self.r.nrows()
    }

    /// Number of observations the matrix was sized for.
    #[must_use]
    pub fn series_len(&self) -> usize {
        self.side() - 1
    }

    /// The underlying array.
    #[must_use]
    pub fn as_array(&self) -> &Array2<f64> {
        &self.r
    }

    /// Consume into the underlying array.
    #[must_use]
    pub fn into_array(self) -> Array2<f64> {
        self.r
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.side() {
            Ok(())
        } else {
            Err(BocpdError::IndexOutOfRange {
                index,
                size: self.side(),
            })
        }
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end || range.end > self.side() {
            Err(BocpdError::IndexOutOfRange {
                index: range.end.max(range.start),
                size: self.side(),
            })
        } else {
            Ok(())
        }
    }

    /// Entry at `(row, col)`.
    ///
    /// # Errors
    /// `IndexOutOfRange` outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_index(row)?;
        self.check_index(col)?;
        Ok(self.r[(row, col)])
    }

    /// Set the entry at `(row, col)`.
    ///
    /// # Errors
    /// `IndexOutOfRange` outside the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_index(row)?;
        self.check_index(col)?;
        self.r[(row, col)] = value;
        Ok(())
    }

    /// Copy of rows `rows` of column `col`.
    ///
    /// # Errors
    /// `IndexOutOfRange` if the column or row range leaves the matrix.
    pub fn column_range(
        &self,
        col: usize,
        rows: Range<usize>,
    ) -> Result<Vec<f64>> {
        self.check_index(col)?;
        self.check_range(&rows)?;
        Ok(self.r.slice(s![rows, col]).to_vec())
    }

    /// Copy of columns `cols` of row `row`.
    ///
    /// # Errors
    /// `IndexOutOfRange` if the row or column range leaves the matrix.
    pub fn row_range(
        &self,
        row: usize,
        cols: Range<usize>,
    ) -> Result<Vec<f64>> {
        self.check_index(row)?;
        self.check_range(&cols)?;
        Ok(self.r.slice(s![row, cols]).to_vec())
    }

    /// Overwrite column `col` starting at `start_row` with `values`.
    ///
    /// # Errors
    /// `IndexOutOfRange` if the values do not fit; the matrix is unchanged.
    pub fn replace_column_range(
        &mut self,
        col: usize,
        start_row: usize,
        values: &[f64],
    ) -> Result<()> {
        self.check_index(col)?;
        let rows = start_row..start_row + values.len();
        self.check_range(&rows)?;
        self.r
            .slice_mut(s![rows, col])
            .iter_mut()
            .zip(values)
            .for_each(|(dst, &v)| *dst = v);
        Ok(())
    }

    /// Scale column `col` to unit sum.
    ///
    /// # Errors
    /// * `IndexOutOfRange` for a column outside the matrix.
    /// * `Degenerate` if the column holds no usable mass.
    pub fn normalize_column(&mut self, col: usize) -> Result<()> {
        let mut column = self.column_range(col, 0..self.side())?;
        vecops::normalize(&mut column)?;
        self.replace_column_range(col, 0, &column)
    }

    /// The run-length distribution after `t` observations (rows `0..=t` of
    /// column `t`).
    ///
    /// # Errors
    /// `IndexOutOfRange` if `t` exceeds the series length.
    pub fn distribution(&self, t: usize) -> Result<Vec<f64>> {
        self.column_range(t, 0..t + 1)
    }

    /// Distributions after each observation, `1..=T`, in the same shape a
    /// streaming detector would report them step by step.
    #[must_use]
    pub fn distributions(&self) -> Vec<Vec<f64>> {
        (1..self.side())
            .map(|t| self.r.slice(s![0..=t, t]).to_vec())
            .collect()
    }

    /// Maximum a posteriori change points. See
    /// [`map_changepoints`](crate::utils::map_changepoints).
    #[must_use]
    pub fn map_changepoints(&self) -> Vec<usize> {
        map_changepoints(&self.distributions())
    }
}
