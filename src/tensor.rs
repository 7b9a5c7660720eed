//! Owned n-dimensional arrays
//!
//! [`Tensor`] is a flat row-major buffer paired with its shape. Image batches
//! use NCHW layout: element `(n, c, y, x)` lives at
//! `((n * C + c) * H + y) * W + x`.

use crate::error::{ConvNetError, Result};
use crate::scalar::Scalar;
use crate::utils::SimpleRng;

/// Row-major n-d array of scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Scalar> Tensor<T> {
    /// Tensor of the given shape filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, T::zero())
    }

    /// Tensor of the given shape filled with `value`.
    pub fn full(shape: &[usize], value: T) -> Self {
        Self {
            shape: shape.to_vec(),
            data: vec![value; shape.iter().product()],
        }
    }

    /// Zero tensor with the same shape as `other`.
    pub fn zeros_like(other: &Tensor<T>) -> Self {
        Self::zeros(&other.shape)
    }

    /// Wrap an existing buffer, checking that its length matches `shape`.
    pub fn from_vec(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(ConvNetError::ShapeMismatch {
                what: "tensor data",
                expected: vec![expected],
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    /// Samples every element from N(0, std²).
    pub fn randn(shape: &[usize], std: f64, rng: &mut SimpleRng) -> Self {
        let len: usize = shape.iter().product();
        let data = (0..len)
            .map(|_| T::of_f64(std * rng.next_gaussian()))
            .collect();
        Self {
            shape: shape.to_vec(),
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Size of dimension `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis` is out of bounds.
    pub fn dim(&self, axis: usize) -> usize {
        self.shape[axis]
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Same data viewed under a new shape with the same element count.
    pub fn reshape(mut self, shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != self.data.len() {
            return Err(ConvNetError::ShapeMismatch {
                what: "reshape",
                expected: shape.to_vec(),
                actual: self.shape,
            });
        }
        self.shape = shape.to_vec();
        Ok(self)
    }

    /// Sum of squared elements (squared Frobenius norm).
    pub fn sum_squares(&self) -> T {
        self.data.iter().map(|&v| v * v).sum()
    }

    /// `self += alpha * other`.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn add_scaled(&mut self, alpha: T, other: &Tensor<T>) {
        assert_eq!(self.shape, other.shape, "add_scaled shape mismatch");
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = *a + alpha * b;
        }
    }

    /// Element-wise map into a new tensor of the same shape.
    pub fn map(&self, f: impl Fn(T) -> T) -> Self {
        Self {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Index of the largest element in each row of a 2-D tensor.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is not 2-D.
    pub fn argmax_rows(&self) -> Vec<usize> {
        assert_eq!(self.ndim(), 2, "argmax_rows expects a 2-D tensor");
        let cols = self.shape[1];
        if cols == 0 {
            return vec![0; self.shape[0]];
        }
        self.data
            .chunks_exact(cols)
            .map(|row| {
                let mut best = 0;
                for (j, &v) in row.iter().enumerate().skip(1) {
                    if v > row[best] {
                        best = j;
                    }
                }
                best
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Tensor::<f32>::from_vec(&[2, 3], vec![0.0; 6]).is_ok());
        let err = Tensor::<f32>::from_vec(&[2, 3], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, ConvNetError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_reshape_keeps_data() {
        let t = Tensor::<f64>::from_vec(&[2, 3], (0..6).map(|v| v as f64).collect()).unwrap();
        let r = t.clone().reshape(&[3, 2]).unwrap();
        assert_eq!(r.shape(), &[3, 2]);
        assert_eq!(r.data(), t.data());
        assert!(t.reshape(&[4, 2]).is_err());
    }

    #[test]
    fn test_sum_squares_and_add_scaled() {
        let mut a = Tensor::<f64>::from_vec(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(a.sum_squares(), 14.0);

        let b = Tensor::<f64>::full(&[3], 1.0);
        a.add_scaled(2.0, &b);
        assert_eq!(a.data(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_argmax_rows_prefers_first_max() {
        let t = Tensor::<f32>::from_vec(&[2, 3], vec![1.0, 5.0, 5.0, 0.0, -1.0, -2.0]).unwrap();
        assert_eq!(t.argmax_rows(), vec![1, 0]);
    }

    #[test]
    fn test_randn_is_deterministic() {
        let mut rng1 = SimpleRng::new(7);
        let mut rng2 = SimpleRng::new(7);
        let a = Tensor::<f32>::randn(&[4, 4], 1e-2, &mut rng1);
        let b = Tensor::<f32>::randn(&[4, 4], 1e-2, &mut rng2);
        assert_eq!(a, b);
        assert!(a.data().iter().any(|&v| v != 0.0));
    }
}
