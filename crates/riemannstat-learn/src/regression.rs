//! Linear least squares from covariates to flattened points.
//!
//! The model regresses flattened point coordinates on covariate vectors,
//! solving the normal problem through an SVD of the design matrix.
//! Predictions are reshaped back to the point representation of the
//! targets.

use crate::error::{EstimatorError, EstimatorResult};
use riemannstat_core::{
    error::GeometryError,
    point::PointRepr,
    types::{DMatrix, DVector, Scalar},
};
use std::marker::PhantomData;

/// Configuration of the linear model.
#[derive(Debug, Clone)]
pub struct LinearModel {
    fit_intercept: bool,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self {
            fit_intercept: true,
        }
    }
}

impl LinearModel {
    /// Creates a model with an intercept term.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the intercept column.
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Fits coefficients mapping covariates `x` to targets `y`.
    pub fn fit<T: Scalar, P: PointRepr<T>>(
        &self,
        x: &[DVector<T>],
        y: &[P],
    ) -> EstimatorResult<LinearModelFit<T, P>> {
        if x.is_empty() || y.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        if x.len() != y.len() {
            return Err(EstimatorError::invalid_configuration(format!(
                "{} covariate rows for {} targets",
                x.len(),
                y.len()
            )));
        }

        let n_samples = x.len();
        let n_covariates = x[0].len();
        let shape = y[0].shape();
        let n_outputs = y[0].to_coords().len();

        let offset = usize::from(self.fit_intercept);
        let mut design = DMatrix::zeros(n_samples, n_covariates + offset);
        for (row, covariates) in x.iter().enumerate() {
            if covariates.len() != n_covariates {
                return Err(EstimatorError::invalid_configuration(
                    "covariate rows have inconsistent lengths",
                ));
            }
            if self.fit_intercept {
                design[(row, 0)] = T::one();
            }
            for col in 0..n_covariates {
                design[(row, col + offset)] = covariates[col];
            }
        }

        let mut targets = DMatrix::zeros(n_samples, n_outputs);
        for (row, point) in y.iter().enumerate() {
            targets.set_row(row, &point.to_coords().transpose());
        }

        let svd = design.svd(true, true);
        let coefficients = svd
            .solve(&targets, T::EPSILON)
            .map_err(GeometryError::numerical_error)?;

        Ok(LinearModelFit {
            coefficients,
            fit_intercept: self.fit_intercept,
            n_covariates,
            shape,
            _marker: PhantomData,
        })
    }
}

/// Fitted linear model.
#[derive(Debug, Clone)]
pub struct LinearModelFit<T: Scalar, P> {
    /// Coefficient matrix, one flattened output per column; the first row
    /// is the intercept when fitted.
    pub coefficients: DMatrix<T>,
    fit_intercept: bool,
    n_covariates: usize,
    shape: Vec<usize>,
    _marker: PhantomData<P>,
}

impl<T: Scalar, P: PointRepr<T>> LinearModelFit<T, P> {
    /// Predicted point for a single covariate vector.
    pub fn predict_one(&self, covariates: &DVector<T>) -> EstimatorResult<P> {
        if covariates.len() != self.n_covariates {
            return Err(EstimatorError::invalid_configuration(format!(
                "expected {} covariates, got {}",
                self.n_covariates,
                covariates.len()
            )));
        }
        let offset = usize::from(self.fit_intercept);
        let mut row = DVector::zeros(self.n_covariates + offset);
        if self.fit_intercept {
            row[0] = T::one();
        }
        for col in 0..self.n_covariates {
            row[col + offset] = covariates[col];
        }

        let prediction = self.coefficients.transpose() * row;
        Ok(P::from_coords(&prediction, &self.shape)?)
    }

    /// Predicted points for a batch of covariate vectors.
    pub fn predict(&self, x: &[DVector<T>]) -> EstimatorResult<Vec<P>> {
        x.iter().map(|covariates| self.predict_one(covariates)).collect()
    }
}
