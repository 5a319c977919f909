//! Space descriptions consumed by metrics.
//!
//! A space is described by its intrinsic dimension and the shape of a
//! single point. Metrics own a [`SpaceSpec`] and use it to validate
//! configuration at construction and to reshape flattened coordinates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Description of the space a metric is defined on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpaceSpec {
    /// Intrinsic dimension of the space.
    pub dim: usize,
    /// Shape of a single point, one entry per axis.
    pub shape: Vec<usize>,
}

impl SpaceSpec {
    /// Space of vector-shaped points of length `dim`.
    pub fn vector(dim: usize) -> Self {
        Self {
            dim,
            shape: vec![dim],
        }
    }

    /// Space of `n x m` matrix-shaped points.
    pub fn matrix(n: usize, m: usize) -> Self {
        Self {
            dim: n * m,
            shape: vec![n, m],
        }
    }

    /// Space of `n x n` matrix-shaped points.
    pub fn square(n: usize) -> Self {
        Self::matrix(n, n)
    }

    /// Rank of a single point's shape: 1 for vectors, 2 for matrices.
    pub fn point_ndim(&self) -> usize {
        self.shape.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_space() {
        let space = SpaceSpec::vector(3);
        assert_eq!(space.dim, 3);
        assert_eq!(space.shape, vec![3]);
        assert_eq!(space.point_ndim(), 1);
    }

    #[test]
    fn test_matrix_space() {
        let space = SpaceSpec::square(4);
        assert_eq!(space.dim, 16);
        assert_eq!(space.shape, vec![4, 4]);
        assert_eq!(space.point_ndim(), 2);

        let rect = SpaceSpec::matrix(2, 5);
        assert_eq!(rect.dim, 10);
        assert_eq!(rect.shape, vec![2, 5]);
    }
}
