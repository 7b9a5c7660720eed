//! Optimizer abstractions for parameter updates
//!
//! Optimizers define how gradients returned by
//! [`ThreeLayerConvNet::loss`](crate::convnet::ThreeLayerConvNet::loss) are
//! turned into parameter updates. The network never updates itself; callers
//! pass an optimizer to
//! [`apply_gradients`](crate::convnet::ThreeLayerConvNet::apply_gradients).
//!
//! # Example
//!
//! ```ignore
//! use rust_convnet::optimizers::SGD;
//!
//! let mut optimizer = SGD::new(1e-3f32);
//! let out = model.loss(&x, &y)?;
//! model.apply_gradients(&out.grads, &mut optimizer);
//! ```

pub mod sgd;

pub use sgd::SGD;

use crate::scalar::Scalar;

/// Update rule applied to one parameter tensor at a time.
pub trait Optimizer<T: Scalar> {
    /// Update parameters in place using their gradients.
    ///
    /// # Panics
    ///
    /// Implementations may panic if parameters and gradients have different
    /// lengths.
    fn update(&mut self, parameters: &mut [T], gradients: &[T]);

    /// Clear any accumulated optimizer state.
    fn reset(&mut self);

    /// Base learning rate.
    fn learning_rate(&self) -> T;

    /// Replace the learning rate, e.g. for a decay schedule.
    fn set_learning_rate(&mut self, lr: T);
}
