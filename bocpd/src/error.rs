//! Error types

use thiserror::Error;

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, BocpdError>;

/// Errors produced by the run-length recursions, the predictive model and
/// the series I/O helpers.
#[derive(Error, Debug)]
pub enum BocpdError {
    /// Two sequences that must be combined elementwise, or a set of
    /// parallel hyperparameters, have different lengths.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Length implied by the receiving side
        expected: usize,
        /// Length that was actually supplied
        got: usize,
    },

    /// Row or column access outside the declared bounds of a buffer.
    #[error("index out of range: {index} (size: {size})")]
    IndexOutOfRange {
        /// The offending index (or exclusive end of the offending range)
        index: usize,
        /// Size of the indexed dimension
        size: usize,
    },

    /// A hazard parameter or prior hyperparameter is not usable.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The unnormalized run-length mass at a step was zero or not finite.
    #[error("run-length mass degenerated at step {step}")]
    Degenerate {
        /// Zero-based index of the observation being processed
        step: usize,
    },

    /// Reading or writing a series failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A record in a series file could not be parsed as a float.
    #[error("could not parse {value:?} on line {line}")]
    Parse {
        /// One-based line number
        line: usize,
        /// The raw field text
        value: String,
    },
}

impl BocpdError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
