//! Group actions on matrix spaces.
//!
//! A group action maps a group element and a manifold point to a point on
//! the orbit. The actions here are the ones needed to quotient matrix
//! spaces by relabeling symmetries: congruence by an invertible matrix and
//! the two permutation actions (congruence and row multiplication).
//!
//! Permutations are represented as index vectors: position `i` holding
//! value `j` means node `i` is relabeled to node `j`. Batches of group
//! elements are slices, inverted row by row.

use crate::{
    error::{GeometryError, Result},
    types::{DMatrix, Scalar},
};
use std::fmt::Debug;
use std::marker::PhantomData;

/// A permutation of `0..n`, stored as an index vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Builds a permutation from an index vector.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidConfiguration` if an index is out of range or
    /// repeated.
    pub fn new(indices: Vec<usize>) -> Result<Self> {
        let n = indices.len();
        let mut seen = vec![false; n];
        for &index in &indices {
            if index >= n {
                return Err(GeometryError::invalid_configuration(format!(
                    "permutation index {index} out of range for length {n}"
                )));
            }
            if seen[index] {
                return Err(GeometryError::invalid_configuration(format!(
                    "permutation index {index} repeated"
                )));
            }
            seen[index] = true;
        }
        Ok(Self(indices))
    }

    /// The identity permutation of length `n`.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Length of the permutation.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the permutation is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Image of index `i`.
    pub fn image(&self, i: usize) -> usize {
        self.0[i]
    }

    /// The underlying index vector.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

/// Inverse of a permutation by index scatter.
///
/// Position `i` holding value `j` becomes position `j` holding value `i`;
/// O(n), no matrix inversion involved.
pub fn invert_permutation(permutation: &Permutation) -> Permutation {
    let mut inverse = vec![0; permutation.len()];
    for (i, &j) in permutation.indices().iter().enumerate() {
        inverse[j] = i;
    }
    Permutation(inverse)
}

/// Inverse of a batch of permutations, each row inverted independently.
pub fn invert_permutations(permutations: &[Permutation]) -> Vec<Permutation> {
    permutations.iter().map(invert_permutation).collect()
}

/// Dense one-hot matrix of a permutation, built by index-triplet scatter.
///
/// The matrix has a 1 at `(i, σ(i))` for every row `i` and zeros elsewhere.
pub fn permutation_matrix_from_vector<T: Scalar>(permutation: &Permutation) -> DMatrix<T> {
    let n = permutation.len();
    let mut matrix = DMatrix::zeros(n, n);
    for (i, &j) in permutation.indices().iter().enumerate() {
        matrix[(i, j)] = T::one();
    }
    matrix
}

/// Trait for group actions on manifold points.
///
/// The orbit-closure invariant `apply(inverse_element(g), apply(g, p)) == p`
/// is verified by the test suites.
pub trait GroupAction<T: Scalar>: Debug + Send + Sync {
    /// Group element representation.
    type Element: Clone + Debug;
    /// Point representation the action operates on.
    type Point;

    /// Action of a group element on a point.
    fn apply(&self, group_elem: &Self::Element, point: &Self::Point) -> Self::Point;

    /// Inverse group element.
    fn inverse_element(&self, group_elem: &Self::Element) -> Result<Self::Element>;
}

/// Congruence action of invertible matrices: `g · p · gᵗ`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CongruenceAction<T: Scalar> {
    _scalar: PhantomData<T>,
}

impl<T: Scalar> CongruenceAction<T> {
    /// Creates the congruence action.
    pub fn new() -> Self {
        Self {
            _scalar: PhantomData,
        }
    }
}

impl<T: Scalar> GroupAction<T> for CongruenceAction<T> {
    type Element = DMatrix<T>;
    type Point = DMatrix<T>;

    fn apply(&self, group_elem: &DMatrix<T>, point: &DMatrix<T>) -> DMatrix<T> {
        group_elem * point * group_elem.transpose()
    }

    fn inverse_element(&self, group_elem: &DMatrix<T>) -> Result<DMatrix<T>> {
        group_elem
            .clone()
            .try_inverse()
            .ok_or_else(|| GeometryError::numerical_error("group element is singular"))
    }
}

/// Congruence action of the permutation group on matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationAction<T: Scalar> {
    _scalar: PhantomData<T>,
}

impl<T: Scalar> PermutationAction<T> {
    /// Creates the permutation congruence action.
    pub fn new() -> Self {
        Self {
            _scalar: PhantomData,
        }
    }
}

impl<T: Scalar> GroupAction<T> for PermutationAction<T> {
    type Element = Permutation;
    type Point = DMatrix<T>;

    fn apply(&self, group_elem: &Permutation, point: &DMatrix<T>) -> DMatrix<T> {
        let perm_mat = permutation_matrix_from_vector::<T>(group_elem);
        &perm_mat * point * perm_mat.transpose()
    }

    fn inverse_element(&self, group_elem: &Permutation) -> Result<Permutation> {
        Ok(invert_permutation(group_elem))
    }
}

/// Action of the permutation group on matrices by row multiplication,
/// `Pᵗ · point`, without the transpose pairing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowPermutationAction<T: Scalar> {
    _scalar: PhantomData<T>,
}

impl<T: Scalar> RowPermutationAction<T> {
    /// Creates the row-permutation action.
    pub fn new() -> Self {
        Self {
            _scalar: PhantomData,
        }
    }
}

impl<T: Scalar> GroupAction<T> for RowPermutationAction<T> {
    type Element = Permutation;
    type Point = DMatrix<T>;

    fn apply(&self, group_elem: &Permutation, point: &DMatrix<T>) -> DMatrix<T> {
        let perm_mat = permutation_matrix_from_vector::<T>(group_elem);
        perm_mat.transpose() * point
    }

    fn inverse_element(&self, group_elem: &Permutation) -> Result<Permutation> {
        Ok(invert_permutation(group_elem))
    }
}
