//! Estimators for manifold-valued data.
//!
//! This crate builds the statistics layer on top of `riemannstat-core`:
//! Fréchet means, the Weiszfeld geometric median, and the align-all-and-
//! compute (AAC) family operating on quotient spaces through the alignment
//! contract.
//!
//! Estimators follow a builder/result split: a configuration object with
//! `with_*` methods whose `fit` borrows the metric and the dataset and
//! returns an immutable fit result (estimate, iteration count, convergence
//! flag). Hitting the iteration cap logs a warning through `tracing` and
//! returns the last estimate with `converged == false`; it is never an
//! error.
//!
//! # Modules
//!
//! - [`aac`]: align-all-and-compute estimators (mean, GPC, regression)
//! - [`error`]: estimator error types
//! - [`frechet_mean`]: Karcher-flow Fréchet mean
//! - [`geometric_median`]: Weiszfeld geometric median
//! - [`pca`]: Euclidean PCA over flattened points
//! - [`regression`]: linear least squares onto point targets

pub mod aac;
pub mod error;
pub mod frechet_mean;
pub mod geometric_median;
pub mod pca;
pub mod regression;

mod util;

// Re-export commonly used items at the crate root
pub use error::{EstimatorError, EstimatorResult};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use riemannstat_learn::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aac::{
        AacFrechet, AacFrechetFit, AacGpc, AacGpcFit, AacRegression, AacRegressionFit,
    };
    pub use crate::error::{EstimatorError, EstimatorResult};
    pub use crate::frechet_mean::{FrechetMean, FrechetMeanFit};
    pub use crate::geometric_median::{WeiszfeldAlgorithm, WeiszfeldFit};
    pub use crate::pca::{EuclideanPca, PcaFit};
    pub use crate::regression::{LinearModel, LinearModelFit};
}
