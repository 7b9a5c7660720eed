//! Numeric precision abstraction
//!
//! Every tensor, parameter and gradient in the crate is generic over a
//! [`Scalar`], which is implemented for `f32` (the default precision) and
//! `f64` (used for numeric gradient checking).

use num_traits::Float;
use std::fmt::{Debug, Display};
use std::iter::Sum;

use crate::config::Precision;

/// Floating point type usable as network storage precision.
pub trait Scalar: Float + Sum + Debug + Display + Default + Send + Sync + 'static {
    /// Precision tag matching this type.
    const PRECISION: Precision;

    /// Lossy conversion from `f64`.
    fn of_f64(value: f64) -> Self;

    /// Widening conversion to `f64`.
    fn as_f64(self) -> f64;
}

impl Scalar for f32 {
    const PRECISION: Precision = Precision::F32;

    fn of_f64(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    const PRECISION: Precision = Precision::F64;

    fn of_f64(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }
}
