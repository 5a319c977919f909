//! Point and tangent-vector representations.
//!
//! Points on a manifold are plain nalgebra arrays: vectors for manifolds
//! whose points have rank 1, matrices for rank 2. A tangent vector shares
//! the representation of its base point; the pairing with a base point is a
//! convention of the call sites, not enforced by the type.
//!
//! The [`PointRepr`] trait is the small set of linear-space operations the
//! metric and estimator layers need to stay generic over both ranks.

use crate::{
    error::{GeometryError, Result},
    types::{DMatrix, DVector, Scalar},
};
use std::fmt::Debug;

/// Linear-space operations shared by vector- and matrix-shaped points.
///
/// Implementations exist for [`DVector`] (rank 1) and [`DMatrix`] (rank 2).
/// Batches of points are represented as slices, one array per sample.
pub trait PointRepr<T: Scalar>: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Rank of a single point's shape: 1 for vectors, 2 for matrices.
    fn point_ndim() -> usize;

    /// Shape of this point, one entry per axis.
    fn shape(&self) -> Vec<usize>;

    /// A zero array with the same shape as `self`.
    fn zeros_like(&self) -> Self;

    /// Elementwise sum.
    fn add(&self, other: &Self) -> Self;

    /// Elementwise difference `self - other`.
    fn sub(&self, other: &Self) -> Self;

    /// Scalar multiple of `self`.
    fn scaled(&self, factor: T) -> Self;

    /// Flatten to intrinsic coordinates (row-major for matrices).
    fn to_coords(&self) -> DVector<T>;

    /// Rebuild a point of the given shape from flattened coordinates.
    ///
    /// # Errors
    ///
    /// Returns a `DimensionMismatch` error if the coordinate length does not
    /// match the product of `shape`.
    fn from_coords(coords: &DVector<T>, shape: &[usize]) -> Result<Self>;

    /// Frobenius / Euclidean norm of the flattened coordinates.
    fn flat_norm(&self) -> T;
}

impl<T: Scalar> PointRepr<T> for DVector<T> {
    fn point_ndim() -> usize {
        1
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn zeros_like(&self) -> Self {
        DVector::zeros(self.len())
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn scaled(&self, factor: T) -> Self {
        self * factor
    }

    fn to_coords(&self) -> DVector<T> {
        self.clone()
    }

    fn from_coords(coords: &DVector<T>, shape: &[usize]) -> Result<Self> {
        if shape.len() != 1 || coords.len() != shape[0] {
            return Err(GeometryError::dimension_mismatch(
                format!("{shape:?}"),
                format!("[{}]", coords.len()),
            ));
        }
        Ok(coords.clone())
    }

    fn flat_norm(&self) -> T {
        self.norm()
    }
}

impl<T: Scalar> PointRepr<T> for DMatrix<T> {
    fn point_ndim() -> usize {
        2
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.nrows(), self.ncols()]
    }

    fn zeros_like(&self) -> Self {
        DMatrix::zeros(self.nrows(), self.ncols())
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn scaled(&self, factor: T) -> Self {
        self * factor
    }

    fn to_coords(&self) -> DVector<T> {
        // Row-major flattening, matching the shape convention of the
        // estimators that reshape between points and coordinate rows.
        let (n, m) = (self.nrows(), self.ncols());
        DVector::from_fn(n * m, |k, _| self[(k / m, k % m)])
    }

    fn from_coords(coords: &DVector<T>, shape: &[usize]) -> Result<Self> {
        if shape.len() != 2 || coords.len() != shape[0] * shape[1] {
            return Err(GeometryError::dimension_mismatch(
                format!("{shape:?}"),
                format!("[{}]", coords.len()),
            ));
        }
        let (n, m) = (shape[0], shape[1]);
        Ok(DMatrix::from_fn(n, m, |i, j| coords[i * m + j]))
    }

    fn flat_norm(&self) -> T {
        self.norm()
    }
}
