//! Stochastic Gradient Descent (SGD) optimizer implementation
//!
//! Vanilla update `parameter = parameter - learning_rate * gradient`.

use crate::optimizers::Optimizer;
use crate::scalar::Scalar;

/// Stochastic Gradient Descent optimizer.
///
/// `w = w - η * ∇L/∂w`, no momentum and no adaptive rates.
///
/// # Example
///
/// ```
/// use rust_convnet::optimizers::{Optimizer, SGD};
///
/// let mut optimizer = SGD::new(0.1f64);
/// let mut params = vec![1.0, 2.0, 3.0];
/// let grads = vec![0.1, 0.2, 0.3];
///
/// optimizer.update(&mut params, &grads);
/// assert!((params[0] - 0.99).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SGD<T> {
    learning_rate: T,
}

impl<T: Scalar> SGD<T> {
    pub fn new(learning_rate: T) -> Self {
        Self { learning_rate }
    }
}

impl<T: Scalar> Optimizer<T> for SGD<T> {
    /// # Panics
    ///
    /// Panics if `parameters` and `gradients` have different lengths.
    fn update(&mut self, parameters: &mut [T], gradients: &[T]) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "Parameters and gradients must have the same length"
        );

        for (param, &grad) in parameters.iter_mut().zip(gradients.iter()) {
            *param = *param - self.learning_rate * grad;
        }
    }

    /// No state to reset.
    fn reset(&mut self) {}

    fn learning_rate(&self) -> T {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: T) {
        self.learning_rate = lr;
    }
}
