//! Rectified linear unit

use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Which inputs were positive during the forward pass.
#[derive(Debug, Clone)]
pub struct ReluCache {
    active: Vec<bool>,
}

/// ReLU applied in place.
///
/// Sets all negative values to zero, keeps positive values unchanged.
pub fn relu_inplace<T: Scalar>(data: &mut [T]) {
    for value in data.iter_mut() {
        if *value < T::zero() {
            *value = T::zero();
        }
    }
}

/// Forward pass `max(0, x)`, consuming the input buffer.
pub fn forward<T: Scalar>(mut x: Tensor<T>) -> (Tensor<T>, ReluCache) {
    let active = x.data().iter().map(|&v| v > T::zero()).collect();
    relu_inplace(x.data_mut());
    (x, ReluCache { active })
}

/// Backward pass: gradient passes only where the input was positive.
///
/// # Panics
///
/// Panics if `dout` has a different element count than the forward input.
pub fn backward<T: Scalar>(mut dout: Tensor<T>, cache: &ReluCache) -> Tensor<T> {
    assert_eq!(
        dout.len(),
        cache.active.len(),
        "relu upstream gradient shape mismatch"
    );
    for (g, &on) in dout.data_mut().iter_mut().zip(cache.active.iter()) {
        if !on {
            *g = T::zero();
        }
    }
    dout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_mixed() {
        let mut data = vec![-2.0f32, -1.0, 0.0, 1.0, 2.0];
        relu_inplace(&mut data);
        assert_eq!(data, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_backward_masks_non_positive_inputs() {
        let x = Tensor::<f64>::from_vec(&[5], vec![-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap();
        let (out, cache) = forward(x);
        assert_eq!(out.data(), &[0.0, 0.0, 0.0, 1.0, 2.0]);

        let dx = backward(Tensor::full(&[5], 3.0), &cache);
        assert_eq!(dx.data(), &[0.0, 0.0, 0.0, 3.0, 3.0]);
    }
}
