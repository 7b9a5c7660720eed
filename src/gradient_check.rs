//! Finite-difference gradient checking
//!
//! Analytic gradients from the backward passes are validated against
//! centered differences `(f(x + h) - f(x - h)) / 2h`. Use `f64` networks for
//! meaningful comparisons; `f32` rounding swamps the differences.

use crate::convnet::{ParamName, ThreeLayerConvNet};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Numeric gradient of a scalar function at `x`.
///
/// `x` is perturbed in place one element at a time and restored afterwards.
pub fn eval_numerical_gradient<T, F>(mut f: F, x: &mut Tensor<T>, h: f64) -> Tensor<T>
where
    T: Scalar,
    F: FnMut(&Tensor<T>) -> T,
{
    let step = T::of_f64(h);
    let two_h = T::of_f64(2.0 * h);
    let mut grad = Tensor::zeros_like(x);

    for i in 0..x.len() {
        let old = x.data()[i];

        x.data_mut()[i] = old + step;
        let plus = f(x);
        x.data_mut()[i] = old - step;
        let minus = f(x);
        x.data_mut()[i] = old;

        grad.data_mut()[i] = (plus - minus) / two_h;
    }
    grad
}

/// Numeric gradient of `sum(f(x) * dout)` for a tensor-valued `f`.
///
/// This is the quantity a layer's backward pass returns as `dx` when given
/// upstream gradient `dout`.
pub fn eval_numerical_gradient_array<T, F>(
    mut f: F,
    x: &mut Tensor<T>,
    dout: &Tensor<T>,
    h: f64,
) -> Tensor<T>
where
    T: Scalar,
    F: FnMut(&Tensor<T>) -> Tensor<T>,
{
    let weighted = |out: Tensor<T>| -> T {
        assert_eq!(out.shape(), dout.shape(), "dout shape mismatch");
        out.data()
            .iter()
            .zip(dout.data().iter())
            .map(|(&o, &g)| o * g)
            .sum()
    };
    eval_numerical_gradient(|x| weighted(f(x)), x, h)
}

/// Numeric gradient of the network's total loss with respect to one
/// parameter tensor.
///
/// The parameter is perturbed in place and restored before returning.
pub fn numerical_param_gradient<T: Scalar>(
    model: &mut ThreeLayerConvNet<T>,
    x: &Tensor<T>,
    y: &[usize],
    name: ParamName,
    h: f64,
) -> Result<Tensor<T>> {
    // Validate once so the perturbation loop cannot fail halfway.
    model.loss(x, y)?;

    let step = T::of_f64(h);
    let two_h = T::of_f64(2.0 * h);
    let len = model.params.get(name).len();
    let mut grad = Tensor::zeros_like(model.params.get(name));

    for i in 0..len {
        let old = model.params.get(name).data()[i];

        model.params.get_mut(name).data_mut()[i] = old + step;
        let plus = model.loss(x, y)?.loss;
        model.params.get_mut(name).data_mut()[i] = old - step;
        let minus = model.loss(x, y)?.loss;
        model.params.get_mut(name).data_mut()[i] = old;

        grad.data_mut()[i] = (plus - minus) / two_h;
    }
    Ok(grad)
}

/// Relative error `||a - b|| / max(||a|| + ||b||, 1e-12)` in `f64`.
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn rel_error<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> f64 {
    assert_eq!(a.shape(), b.shape(), "rel_error shape mismatch");
    let norm = |t: &Tensor<T>| t.data().iter().map(|v| v.as_f64().powi(2)).sum::<f64>().sqrt();
    let diff = a
        .data()
        .iter()
        .zip(b.data().iter())
        .map(|(&x, &y)| (x.as_f64() - y.as_f64()).powi(2))
        .sum::<f64>()
        .sqrt();
    diff / (norm(a) + norm(b)).max(1e-12)
}
