//! Metrics pulled back through an immersion into flat ambient space.
//!
//! Given an immersion f: M → ℝᵐ of an intrinsic chart into a flat ambient
//! space, the pullback of the ambient Euclidean inner product is
//! g(p) = J(p)ᵗ J(p), where J is the Jacobian of f. Christoffel symbols
//! follow from the derivative of g, geodesics are integrated numerically
//! (no closed form is assumed) and parallel transport is approximated by a
//! discretized ladder scheme.
//!
//! The immersion and its Jacobian are supplied by the caller; no automatic
//! differentiation is involved.

use crate::{
    error::{GeometryError, Result},
    metric::RiemannianMetric,
    space::SpaceSpec,
    types::{constants, DMatrix, DVector, Scalar},
};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ladder scheme used to discretize parallel transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LadderScheme {
    /// Pole ladder: shoots through the midpoint of each rung; exact on
    /// symmetric spaces.
    Pole,
    /// Schild's ladder: parallelogram construction on each rung.
    Schild,
}

/// Outcome of a ladder transport: the transported vector together with the
/// point reached at the end of the ladder.
#[derive(Debug, Clone)]
pub struct LadderTransport<P> {
    /// Tangent vector transported to `end_point`.
    pub transported: P,
    /// Point reached by following the transport direction.
    pub end_point: P,
}

/// Riemannian metric induced on an intrinsic chart by an immersion into
/// flat ambient space.
pub struct PullbackMetric<T, F, J>
where
    T: Scalar,
    F: Fn(&DVector<T>) -> DVector<T> + Send + Sync,
    J: Fn(&DVector<T>) -> DMatrix<T> + Send + Sync,
{
    space: SpaceSpec,
    embedding_dim: usize,
    immersion_fn: F,
    jacobian_fn: J,
    integration_steps: usize,
    log_max_iter: usize,
    log_tolerance: T,
    n_rungs: usize,
    scheme: LadderScheme,
}

impl<T, F, J> PullbackMetric<T, F, J>
where
    T: Scalar,
    F: Fn(&DVector<T>) -> DVector<T> + Send + Sync,
    J: Fn(&DVector<T>) -> DMatrix<T> + Send + Sync,
{
    /// Pullback metric on a `dim`-dimensional chart immersed in
    /// `embedding_dim`-dimensional flat space.
    pub fn new(dim: usize, embedding_dim: usize, immersion: F, jacobian_immersion: J) -> Self {
        Self {
            space: SpaceSpec::vector(dim),
            embedding_dim,
            immersion_fn: immersion,
            jacobian_fn: jacobian_immersion,
            integration_steps: 100,
            log_max_iter: 64,
            log_tolerance: <T as Scalar>::from_f64(1e-9),
            n_rungs: 1,
            scheme: LadderScheme::Pole,
        }
    }

    /// Sets the number of integration steps of the geodesic equation.
    pub fn with_integration_steps(mut self, steps: usize) -> Self {
        self.integration_steps = steps;
        self
    }

    /// Sets the iteration cap and tolerance of the shooting solver behind
    /// `log`.
    pub fn with_log_solver(mut self, max_iter: usize, tolerance: T) -> Self {
        self.log_max_iter = max_iter;
        self.log_tolerance = tolerance;
        self
    }

    /// Sets the rung count and scheme used by parallel transport. More
    /// rungs trade compute for accuracy.
    pub fn with_ladder(mut self, n_rungs: usize, scheme: LadderScheme) -> Self {
        self.n_rungs = n_rungs.max(1);
        self.scheme = scheme;
        self
    }

    /// Dimension of the ambient space.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Image of `point` under the immersion.
    pub fn immersion(&self, point: &DVector<T>) -> DVector<T> {
        (self.immersion_fn)(point)
    }

    /// Jacobian of the immersion at `point`, `embedding_dim x dim`.
    pub fn jacobian_immersion(&self, point: &DVector<T>) -> DMatrix<T> {
        (self.jacobian_fn)(point)
    }

    /// Pushforward of an intrinsic tangent vector to the ambient space,
    /// J(point) · tangent_vec.
    pub fn tangent_immersion(&self, tangent_vec: &DVector<T>, point: &DVector<T>) -> DVector<T> {
        self.jacobian_immersion(point) * tangent_vec
    }

    /// Velocity and acceleration of the geodesic equation at state
    /// (position, velocity): ẍᵏ = −Γᵏᵢⱼ ẋⁱ ẋʲ.
    fn geodesic_derivative(
        &self,
        position: &DVector<T>,
        velocity: &DVector<T>,
    ) -> Result<(DVector<T>, DVector<T>)> {
        let gamma = self.christoffels(position)?;
        let dim = self.space.dim;
        let mut acceleration = DVector::zeros(dim);
        for k in 0..dim {
            let mut sum = T::zero();
            for i in 0..dim {
                for j in 0..dim {
                    sum += gamma[k][(i, j)] * velocity[i] * velocity[j];
                }
            }
            acceleration[k] = -sum;
        }
        Ok((velocity.clone(), acceleration))
    }

    /// Parallel transport by a discretized ladder.
    ///
    /// Transports `tangent_vec` from `base_point` along `direction`,
    /// splitting the transport geodesic into the configured number of rungs
    /// and applying one pole-ladder or Schild's-ladder construction per
    /// rung. Returns the transported vector together with the end point of
    /// the transport geodesic.
    pub fn ladder_parallel_transport(
        &self,
        tangent_vec: &DVector<T>,
        base_point: &DVector<T>,
        direction: &DVector<T>,
    ) -> Result<LadderTransport<DVector<T>>> {
        let n_rungs = self.n_rungs;
        let scale = <T as crate::types::Scalar>::from_usize(n_rungs);

        let mut current_point = base_point.clone();
        let rung_vec = tangent_vec / scale;
        let mut base_shoot = self.exp(&rung_vec, &current_point)?;

        for i_rung in 0..n_rungs {
            let frac = <T as crate::types::Scalar>::from_usize(i_rung + 1) / scale;
            let next_point = self.exp(&(direction * frac), base_point)?;
            base_shoot = match self.scheme {
                LadderScheme::Pole => self.pole_ladder_step(&current_point, &next_point, &base_shoot)?,
                LadderScheme::Schild => {
                    self.schild_ladder_step(&current_point, &next_point, &base_shoot)?
                }
            };
            current_point = next_point;
        }

        let mut transported = self.log(&base_shoot, &current_point)?;
        if self.scheme == LadderScheme::Pole && n_rungs % 2 == 1 {
            // The pole construction flips the vector on every rung.
            transported = -transported;
        }
        transported *= scale;

        Ok(LadderTransport {
            transported,
            end_point: current_point,
        })
    }

    /// One pole-ladder rung: shoot through the midpoint of the geodesic
    /// from `base_point` to `next_point`.
    fn pole_ladder_step(
        &self,
        base_point: &DVector<T>,
        next_point: &DVector<T>,
        base_shoot: &DVector<T>,
    ) -> Result<DVector<T>> {
        let half = <T as Scalar>::from_f64(0.5);
        let mid_tangent = self.log(next_point, base_point)? * half;
        let mid_point = self.exp(&mid_tangent, base_point)?;
        let shoot_tangent = -self.log(base_shoot, &mid_point)?;
        self.exp(&shoot_tangent, &mid_point)
    }

    /// One Schild's-ladder rung: parallelogram through the midpoint of the
    /// diagonal from `base_shoot` to `next_point`.
    fn schild_ladder_step(
        &self,
        base_point: &DVector<T>,
        next_point: &DVector<T>,
        base_shoot: &DVector<T>,
    ) -> Result<DVector<T>> {
        let half = <T as Scalar>::from_f64(0.5);
        let mid_tangent = self.log(next_point, base_shoot)? * half;
        let mid_point = self.exp(&mid_tangent, base_shoot)?;
        let shoot_tangent = -self.log(base_point, &mid_point)?;
        self.exp(&shoot_tangent, &mid_point)
    }
}

impl<T, F, J> fmt::Debug for PullbackMetric<T, F, J>
where
    T: Scalar,
    F: Fn(&DVector<T>) -> DVector<T> + Send + Sync,
    J: Fn(&DVector<T>) -> DMatrix<T> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullbackMetric")
            .field("dim", &self.space.dim)
            .field("embedding_dim", &self.embedding_dim)
            .field("integration_steps", &self.integration_steps)
            .field("n_rungs", &self.n_rungs)
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl<T, F, J> RiemannianMetric<T> for PullbackMetric<T, F, J>
where
    T: Scalar,
    F: Fn(&DVector<T>) -> DVector<T> + Send + Sync,
    J: Fn(&DVector<T>) -> DMatrix<T> + Send + Sync,
{
    type Point = DVector<T>;

    fn space(&self) -> &SpaceSpec {
        &self.space
    }

    fn metric_matrix(&self, base_point: &DVector<T>) -> Result<DMatrix<T>> {
        let jacobian = self.jacobian_immersion(base_point);
        if jacobian.nrows() != self.embedding_dim || jacobian.ncols() != self.space.dim {
            return Err(GeometryError::dimension_mismatch(
                format!("({}, {})", self.embedding_dim, self.space.dim),
                format!("({}, {})", jacobian.nrows(), jacobian.ncols()),
            ));
        }
        Ok(jacobian.transpose() * &jacobian)
    }

    fn inner_product_derivative_matrix(&self, base_point: &DVector<T>) -> Result<Vec<DMatrix<T>>> {
        let dim = self.space.dim;
        let step = constants::finite_difference_step::<T>();
        let two_step = step + step;

        let mut derivative = Vec::with_capacity(dim);
        for k in 0..dim {
            let mut forward = base_point.clone();
            forward[k] += step;
            let mut backward = base_point.clone();
            backward[k] -= step;

            let g_forward = self.metric_matrix(&forward)?;
            let g_backward = self.metric_matrix(&backward)?;
            derivative.push((g_forward - g_backward) / two_step);
        }
        Ok(derivative)
    }

    fn christoffels(&self, base_point: &DVector<T>) -> Result<Vec<DMatrix<T>>> {
        let dim = self.space.dim;
        let derivative = self.inner_product_derivative_matrix(base_point)?;
        let cometric = self.cometric_matrix(base_point)?;
        let half = <T as Scalar>::from_f64(0.5);

        let mut gamma = vec![DMatrix::zeros(dim, dim); dim];
        for k in 0..dim {
            for i in 0..dim {
                for j in 0..dim {
                    let mut sum = T::zero();
                    for l in 0..dim {
                        sum += cometric[(k, l)]
                            * (derivative[i][(l, j)] + derivative[j][(l, i)]
                                - derivative[l][(i, j)]);
                    }
                    gamma[k][(i, j)] = sum * half;
                }
            }
        }
        Ok(gamma)
    }

    /// Exponential map by RK4 integration of the geodesic equation over
    /// unit time.
    fn exp(&self, tangent_vec: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        let n = self.integration_steps;
        let h = T::one() / <T as crate::types::Scalar>::from_usize(n);
        let half = <T as Scalar>::from_f64(0.5);
        let sixth = T::one() / <T as Scalar>::from_f64(6.0);
        let two = <T as Scalar>::from_f64(2.0);

        let mut position = base_point.clone();
        let mut velocity = tangent_vec.clone();
        for _ in 0..n {
            let (k1x, k1v) = self.geodesic_derivative(&position, &velocity)?;
            let (k2x, k2v) = self.geodesic_derivative(
                &(&position + &k1x * (h * half)),
                &(&velocity + &k1v * (h * half)),
            )?;
            let (k3x, k3v) = self.geodesic_derivative(
                &(&position + &k2x * (h * half)),
                &(&velocity + &k2v * (h * half)),
            )?;
            let (k4x, k4v) =
                self.geodesic_derivative(&(&position + &k3x * h), &(&velocity + &k3v * h))?;

            position += (k1x + &k2x * two + &k3x * two + k4x) * (h * sixth);
            velocity += (k1v + &k2v * two + &k3v * two + k4v) * (h * sixth);
        }
        Ok(position)
    }

    /// Logarithm by shooting: fixed-point correction of the tangent vector
    /// until the integrated endpoint matches `point`.
    fn log(&self, point: &DVector<T>, base_point: &DVector<T>) -> Result<DVector<T>> {
        let mut tangent_vec = point - base_point;
        for _ in 0..self.log_max_iter {
            let reached = self.exp(&tangent_vec, base_point)?;
            let residual = point - reached;
            if residual.norm() <= self.log_tolerance {
                return Ok(tangent_vec);
            }
            tangent_vec += residual;
        }
        Err(GeometryError::numerical_error(
            "shooting solver for the logarithm did not converge; \
             the target point may lie outside the injectivity domain",
        ))
    }

    fn parallel_transport(
        &self,
        tangent_vec: &DVector<T>,
        base_point: &DVector<T>,
        direction: Option<&DVector<T>>,
        end_point: Option<&DVector<T>>,
    ) -> Result<DVector<T>> {
        let direction = match (direction, end_point) {
            (Some(dir), _) => dir.clone(),
            (None, Some(end)) => self.log(end, base_point)?,
            (None, None) => {
                return Err(GeometryError::invalid_configuration(
                    "specify a direction or an end point for parallel transport",
                ))
            }
        };
        self.ladder_parallel_transport(tangent_vec, base_point, &direction)
            .map(|ladder| ladder.transported)
    }

    fn injectivity_radius(&self, _base_point: &DVector<T>) -> Result<T> {
        Err(GeometryError::not_implemented("injectivity_radius"))
    }
}
