//! Bayesian online change point detection over scalar series with a
//! Normal-Inverse-Gamma prior and Student-t predictive.
//!
//! Two recursions compute the same run-length posteriors:
//!  * [`Bocpd`] keeps only the current run-length distribution and is fed
//!    one observation at a time.
//!  * [`detect_batch`] keeps the whole triangular [`RunLengthMatrix`] for a
//!    known series.
//!
//! Both are driven by a [`Hazard`] and a [`PredictiveModel`], normally
//! [`ConstantHazard`] and [`StudentTUpdater`].
//!
//! ```rust
//! use bocpd::{Bocpd, ConstantHazard, StudentTUpdater};
//!
//! let model = StudentTUpdater::new(&[0.1], &[0.01], &[1.0], &[0.0]).unwrap();
//! let mut cpd = Bocpd::new(250.0, ConstantHazard, model).unwrap();
//! for x in [0.1, -0.2, 0.05, 9.8, 10.1, 10.0] {
//!     cpd.update(x).unwrap();
//! }
//! assert_eq!(cpd.maxes().len(), 6);
//! assert!(cpd.most_likely_run_length() < 4);
//! ```
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

mod batch;
pub use batch::*;

mod error;
pub use error::*;

pub mod generators;

mod hazard;
pub use hazard::*;

mod online;
pub use online::*;

mod predictive;
pub use predictive::*;

mod run_length_matrix;
pub use run_length_matrix::*;

mod student_t;
pub use student_t::*;

mod traits;
pub use self::traits::*;

pub mod utils;
pub mod vecops;

pub use rv;
