//! Euclidean principal component analysis on flattened points.
//!
//! Points are flattened to coordinate rows, centered, and decomposed by a
//! thin SVD. The reshaped accessors return components and mean in the point
//! representation of the dataset, which is what the alignment-based
//! estimators consume.

use crate::error::{EstimatorError, EstimatorResult};
use riemannstat_core::{
    error::GeometryError,
    point::PointRepr,
    types::{DMatrix, DVector, Scalar},
};
use std::marker::PhantomData;

/// Configuration of the PCA solver.
#[derive(Debug, Clone)]
pub struct EuclideanPca {
    n_components: usize,
}

impl EuclideanPca {
    /// PCA keeping `n_components` leading components.
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    /// Fits the decomposition on a dataset of points.
    pub fn fit<T: Scalar, P: PointRepr<T>>(&self, points: &[P]) -> EstimatorResult<PcaFit<T, P>> {
        let n_samples = points.len();
        if n_samples < 2 {
            return Err(EstimatorError::invalid_configuration(
                "PCA needs at least two samples",
            ));
        }
        let shape = points[0].shape();
        let n_features = points[0].to_coords().len();
        let max_components = n_samples.min(n_features);
        if self.n_components == 0 || self.n_components > max_components {
            return Err(EstimatorError::invalid_configuration(format!(
                "n_components must be in 1..={max_components}, got {}",
                self.n_components
            )));
        }

        let mut data = DMatrix::zeros(n_samples, n_features);
        for (row, point) in points.iter().enumerate() {
            data.set_row(row, &point.to_coords().transpose());
        }

        let mut mean = DVector::zeros(n_features);
        for row in 0..n_samples {
            mean += data.row(row).transpose();
        }
        mean /= <T as riemannstat_core::types::Scalar>::from_usize(n_samples);
        for row in 0..n_samples {
            let centered = data.row(row).transpose() - &mean;
            data.set_row(row, &centered.transpose());
        }

        let svd = data.svd(true, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| GeometryError::numerical_error("SVD did not produce V^T"))?;

        let denom = <T as riemannstat_core::types::Scalar>::from_usize(n_samples - 1);
        let variances: Vec<T> = svd
            .singular_values
            .iter()
            .map(|&s| s * s / denom)
            .collect();
        let total_variance = variances.iter().fold(T::zero(), |acc, &v| acc + v);

        let singular_values: Vec<T> = svd
            .singular_values
            .iter()
            .take(self.n_components)
            .copied()
            .collect();
        let explained_variance: Vec<T> =
            variances.iter().take(self.n_components).copied().collect();
        let explained_variance_ratio: Vec<T> = explained_variance
            .iter()
            .map(|&v| {
                if total_variance > T::zero() {
                    v / total_variance
                } else {
                    T::zero()
                }
            })
            .collect();

        let components = v_t.rows(0, self.n_components).into_owned();

        Ok(PcaFit {
            components,
            singular_values,
            explained_variance,
            explained_variance_ratio,
            mean,
            shape,
            _marker: PhantomData,
        })
    }
}

/// Fitted principal component decomposition.
#[derive(Debug, Clone)]
pub struct PcaFit<T: Scalar, P> {
    /// Principal axes, one flattened component per row.
    pub components: DMatrix<T>,
    /// Leading singular values of the centered data.
    pub singular_values: Vec<T>,
    /// Variance explained by each kept component.
    pub explained_variance: Vec<T>,
    /// Fraction of the total variance explained by each kept component.
    pub explained_variance_ratio: Vec<T>,
    /// Per-feature mean of the flattened data.
    pub mean: DVector<T>,
    shape: Vec<usize>,
    _marker: PhantomData<P>,
}

impl<T: Scalar, P: PointRepr<T>> PcaFit<T, P> {
    /// The mean reshaped to the point representation.
    pub fn mean_point(&self) -> EstimatorResult<P> {
        Ok(P::from_coords(&self.mean, &self.shape)?)
    }

    /// The `index`-th component reshaped to the point representation.
    pub fn component_point(&self, index: usize) -> EstimatorResult<P> {
        if index >= self.components.nrows() {
            return Err(EstimatorError::invalid_configuration(format!(
                "component index {index} out of range for {} components",
                self.components.nrows()
            )));
        }
        let row = self.components.row(index).transpose();
        Ok(P::from_coords(&row, &self.shape)?)
    }
}
