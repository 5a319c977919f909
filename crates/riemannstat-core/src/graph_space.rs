//! Graph space: matrices quotiented by node relabeling.
//!
//! A graph on `n` nodes is an `n x n` adjacency matrix; two matrices
//! related by a permutation congruence describe the same graph. The
//! quotient structure is exposed through the [`Alignment`] contract: align
//! every sample to a reference (or to a geodesic) by searching for the
//! group element minimizing the total-space distance, and return the
//! transformed samples.
//!
//! The aligner here searches node permutations exhaustively, which is exact
//! and factorial in the node count; it is intended for the small graphs the
//! estimators are typically fit on.

use crate::{
    action::{GroupAction, Permutation, PermutationAction},
    error::{GeometryError, Result},
    flat::MatrixFlatMetric,
    metric::{Geodesic, RiemannianMetric},
    types::{DMatrix, Scalar},
};
use std::fmt::Debug;

/// Largest node count accepted by the exhaustive aligner.
const MAX_EXHAUSTIVE_NODES: usize = 8;

/// Point representation of an alignment's total space.
pub type AlignedPoint<T, A> = <<A as Alignment<T>>::Metric as RiemannianMetric<T>>::Point;

/// Alignment of datasets to a reference under a group action.
///
/// Implementations select, per sample, the group element minimizing the
/// total-space distance to the target, and return the samples already
/// transformed.
pub trait Alignment<T: Scalar>: Debug + Send + Sync {
    /// Metric of the total (unquotiented) space.
    type Metric: RiemannianMetric<T>;

    /// The total-space metric.
    fn total_space_metric(&self) -> &Self::Metric;

    /// Aligns every point to `reference`.
    fn align_point_to_point(
        &self,
        reference: &AlignedPoint<T, Self>,
        points: &[AlignedPoint<T, Self>],
    ) -> Result<Vec<AlignedPoint<T, Self>>>;

    /// Aligns every point to the closest point of `geodesic`.
    fn align_point_to_geodesic(
        &self,
        geodesic: &Geodesic<'_, T, Self::Metric>,
        points: &[AlignedPoint<T, Self>],
    ) -> Result<Vec<AlignedPoint<T, Self>>>;

    /// Aligns each point to its paired reference.
    fn align_pairwise(
        &self,
        references: &[AlignedPoint<T, Self>],
        points: &[AlignedPoint<T, Self>],
    ) -> Result<Vec<AlignedPoint<T, Self>>>;
}

/// Space of graphs on `n_nodes` nodes, represented by adjacency matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSpace {
    n_nodes: usize,
}

impl GraphSpace {
    /// Space of graphs on `n_nodes` nodes.
    pub fn new(n_nodes: usize) -> Self {
        Self { n_nodes }
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Quotient metric with the default configuration.
    pub fn metric<T: Scalar>(&self) -> Result<GraphSpaceMetric<T>> {
        GraphSpaceMetric::new(self.n_nodes)
    }
}

/// Quotient metric of graph space: flat total space plus exhaustive
/// permutation alignment.
#[derive(Debug, Clone)]
pub struct GraphSpaceMetric<T: Scalar> {
    n_nodes: usize,
    total: MatrixFlatMetric<T>,
    action: PermutationAction<T>,
    n_grid: usize,
}

impl<T: Scalar> GraphSpaceMetric<T> {
    /// Quotient metric on graphs with `n_nodes` nodes.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidConfiguration` when `n_nodes` exceeds the
    /// exhaustive-search limit.
    pub fn new(n_nodes: usize) -> Result<Self> {
        if n_nodes > MAX_EXHAUSTIVE_NODES {
            return Err(GeometryError::invalid_configuration(format!(
                "exhaustive alignment searches {n_nodes}! permutations; \
                 at most {MAX_EXHAUSTIVE_NODES} nodes are supported"
            )));
        }
        Ok(Self {
            n_nodes,
            total: MatrixFlatMetric::square(n_nodes),
            action: PermutationAction::new(),
            n_grid: 10,
        })
    }

    /// Sets the number of grid points used to discretize geodesics during
    /// point-to-geodesic alignment.
    pub fn with_geodesic_grid(mut self, n_grid: usize) -> Self {
        self.n_grid = n_grid.max(2);
        self
    }

    /// Number of nodes of the underlying graphs.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Quotient distance: smallest total-space distance over the orbit of
    /// `point_b`.
    pub fn quotient_dist(&self, point_a: &DMatrix<T>, point_b: &DMatrix<T>) -> Result<T> {
        let aligned = self.align_single(point_a, point_b)?;
        self.total.dist(point_a, &aligned)
    }

    /// Best orbit representative of `point` with respect to `reference`.
    fn align_single(&self, reference: &DMatrix<T>, point: &DMatrix<T>) -> Result<DMatrix<T>> {
        let mut best: Option<(T, DMatrix<T>)> = None;
        for perm in enumerate_permutations(self.n_nodes) {
            let candidate = self.action.apply(&perm, point);
            let dist = self.total.dist(reference, &candidate)?;
            let better = best.as_ref().map_or(true, |(best_dist, _)| dist < *best_dist);
            if better {
                best = Some((dist, candidate));
            }
        }
        best.map(|(_, aligned)| aligned).ok_or_else(|| {
            GeometryError::invalid_configuration("cannot align graphs with zero nodes")
        })
    }
}

impl<T: Scalar> Alignment<T> for GraphSpaceMetric<T> {
    type Metric = MatrixFlatMetric<T>;

    fn total_space_metric(&self) -> &MatrixFlatMetric<T> {
        &self.total
    }

    fn align_point_to_point(
        &self,
        reference: &DMatrix<T>,
        points: &[DMatrix<T>],
    ) -> Result<Vec<DMatrix<T>>> {
        points
            .iter()
            .map(|point| self.align_single(reference, point))
            .collect()
    }

    fn align_point_to_geodesic(
        &self,
        geodesic: &Geodesic<'_, T, MatrixFlatMetric<T>>,
        points: &[DMatrix<T>],
    ) -> Result<Vec<DMatrix<T>>> {
        let step = T::one() / <T as crate::types::Scalar>::from_usize(self.n_grid - 1);
        let times: Vec<T> = (0..self.n_grid)
            .map(|i| <T as crate::types::Scalar>::from_usize(i) * step)
            .collect();
        let grid = geodesic.sample(&times)?;

        points
            .iter()
            .map(|point| {
                let mut best: Option<(T, DMatrix<T>)> = None;
                for perm in enumerate_permutations(self.n_nodes) {
                    let candidate = self.action.apply(&perm, point);
                    for grid_point in &grid {
                        let dist = self.total.dist(grid_point, &candidate)?;
                        let better =
                            best.as_ref().map_or(true, |(best_dist, _)| dist < *best_dist);
                        if better {
                            best = Some((dist, candidate.clone()));
                        }
                    }
                }
                best.map(|(_, aligned)| aligned).ok_or_else(|| {
                    GeometryError::invalid_configuration("cannot align graphs with zero nodes")
                })
            })
            .collect()
    }

    fn align_pairwise(
        &self,
        references: &[DMatrix<T>],
        points: &[DMatrix<T>],
    ) -> Result<Vec<DMatrix<T>>> {
        if references.len() != points.len() {
            return Err(GeometryError::dimension_mismatch(
                format!("{} references", references.len()),
                format!("{} points", points.len()),
            ));
        }
        references
            .iter()
            .zip(points)
            .map(|(reference, point)| self.align_single(reference, point))
            .collect()
    }
}

/// All permutations of `0..n` in lexicographic order.
fn enumerate_permutations(n: usize) -> Vec<Permutation> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(n);
    let mut used = vec![false; n];
    build_permutations(n, &mut current, &mut used, &mut out);
    out
}

fn build_permutations(
    n: usize,
    current: &mut Vec<usize>,
    used: &mut [bool],
    out: &mut Vec<Permutation>,
) {
    if current.len() == n {
        out.push(
            Permutation::new(current.clone()).expect("indices are unique by construction"),
        );
        return;
    }
    for i in 0..n {
        if !used[i] {
            used[i] = true;
            current.push(i);
            build_permutations(n, current, used, out);
            current.pop();
            used[i] = false;
        }
    }
}
