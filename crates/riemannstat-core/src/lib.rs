//! Geometry primitives for manifold-valued statistics.
//!
//! This crate provides the geometric layer consumed by the estimators in
//! `riemannstat-learn`: the Riemannian metric contract with its flat and
//! pullback specializations, group actions on matrix spaces, and the
//! graph-space quotient with its alignment routines.
//!
//! # Key Concepts
//!
//! - **Metrics**: inner products on tangent spaces, with exponential and
//!   logarithmic maps, geodesics and parallel transport
//!   ([`metric::RiemannianMetric`])
//! - **Flat metrics**: constant inner product, additive exp/log
//!   ([`flat::FlatMetric`], [`flat::MatrixFlatMetric`])
//! - **Pullback metrics**: geometry induced through an immersion into flat
//!   ambient space ([`pullback::PullbackMetric`])
//! - **Group actions**: congruence and permutation actions
//!   ([`action::GroupAction`])
//! - **Alignment**: quotient structure of graph space
//!   ([`graph_space::Alignment`])
//!
//! # Modules
//!
//! - [`action`]: group actions and permutation utilities
//! - [`batch`]: batched metric operations over datasets
//! - [`error`]: error types for geometric operations
//! - [`flat`]: flat metric specializations
//! - [`graph_space`]: graph space and exhaustive alignment
//! - [`metric`]: the Riemannian metric contract and geodesics
//! - [`point`]: point and tangent-vector representations
//! - [`pullback`]: pullback metric specialization
//! - [`space`]: space descriptions
//! - [`types`]: scalar trait, aliases and numerical constants

pub mod action;
pub mod batch;
pub mod error;
pub mod flat;
pub mod graph_space;
pub mod metric;
pub mod point;
pub mod pullback;
pub mod space;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{GeometryError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use riemannstat_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::action::{
        invert_permutation, invert_permutations, permutation_matrix_from_vector,
        CongruenceAction, GroupAction, Permutation, PermutationAction, RowPermutationAction,
    };
    pub use crate::batch::{dists_to_point, exps_at, logs_at, paired_dists};
    pub use crate::error::{GeometryError, Result};
    pub use crate::flat::{FlatMetric, MatrixFlatMetric};
    pub use crate::graph_space::{AlignedPoint, Alignment, GraphSpace, GraphSpaceMetric};
    pub use crate::metric::{Geodesic, RiemannianMetric};
    pub use crate::point::PointRepr;
    pub use crate::pullback::{LadderScheme, LadderTransport, PullbackMetric};
    pub use crate::space::SpaceSpec;
    pub use crate::types::{constants, DMatrix, DVector, Scalar};
}
