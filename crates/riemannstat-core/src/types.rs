//! Type definitions and aliases for manifold geometry.
//!
//! This module provides common type aliases, the scalar trait used by all
//! metric computations, and numerical constants.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in geometric computations (f32 or f64).
///
/// This trait combines all the necessary numeric traits required by the
/// metric and estimator implementations.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for near-equality comparisons.
    const DEFAULT_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a
    /// non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for iteration counts and averaging).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-4;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-8;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Numerical constants for the supported precision levels.
pub mod constants {
    use super::Scalar;

    /// Get machine epsilon for the given scalar type.
    pub fn epsilon<T: Scalar>() -> T {
        T::EPSILON
    }

    /// Get the default near-equality tolerance (atol).
    pub fn atol<T: Scalar>() -> T {
        T::DEFAULT_TOLERANCE
    }

    /// Step used for central finite differences, `eps^(1/3)`.
    pub fn finite_difference_step<T: Scalar>() -> T {
        num_traits::Float::cbrt(T::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_constants() {
        assert_eq!(f32::EPSILON, std::f32::EPSILON);
        assert_eq!(f64::EPSILON, std::f64::EPSILON);
        assert!(f32::DEFAULT_TOLERANCE > 0.0);
        assert!(f64::DEFAULT_TOLERANCE > 0.0);
        assert!(constants::atol::<f64>() > constants::epsilon::<f64>());
    }

    #[test]
    fn test_scalar_conversions() {
        let val_f64 = 3.14159;
        let val_f32 = <f32 as Scalar>::from_f64(val_f64);
        assert_relative_eq!(val_f32 as f64, val_f64, epsilon = 1e-6);

        let back_f64 = val_f32.to_f64();
        assert_relative_eq!(back_f64, val_f32 as f64);

        assert_eq!(<f64 as Scalar>::from_usize(7), 7.0);
    }

    #[test]
    fn test_finite_difference_step() {
        let h = constants::finite_difference_step::<f64>();
        assert!(h > f64::EPSILON);
        assert!(h < 1e-4);
    }
}
