//! Common layer sandwiches
//!
//! `conv -> relu -> pool` and `affine -> relu`, each with a single cache that
//! bundles the caches of its parts.

use super::affine::{self, AffineCache};
use super::conv::{self, ConvCache, ConvParams};
use super::pool::{self, PoolCache, PoolParams};
use super::relu::{self, ReluCache};
use crate::scalar::Scalar;
use crate::tensor::Tensor;

#[derive(Debug)]
pub struct ConvReluPoolCache<'a, T> {
    conv: ConvCache<'a, T>,
    relu: ReluCache,
    pool: PoolCache,
}

#[derive(Debug)]
pub struct AffineReluCache<'a, T> {
    affine: AffineCache<'a, T>,
    relu: ReluCache,
}

pub fn conv_relu_pool_forward<'a, T: Scalar>(
    x: &'a Tensor<T>,
    w: &'a Tensor<T>,
    b: &Tensor<T>,
    conv_params: ConvParams,
    pool_params: PoolParams,
) -> (Tensor<T>, ConvReluPoolCache<'a, T>) {
    let (a, conv) = conv::forward(x, w, b, conv_params);
    let (s, relu) = relu::forward(a);
    let (out, pool) = pool::forward(&s, pool_params);
    (out, ConvReluPoolCache { conv, relu, pool })
}

/// Returns `(dx, dw, db)` for the convolution.
pub fn conv_relu_pool_backward<T: Scalar>(
    dout: &Tensor<T>,
    cache: &ConvReluPoolCache<'_, T>,
) -> (Tensor<T>, Tensor<T>, Tensor<T>) {
    let ds = pool::backward(dout, &cache.pool);
    let da = relu::backward(ds, &cache.relu);
    conv::backward(&da, &cache.conv)
}

pub fn affine_relu_forward<'a, T: Scalar>(
    x: &'a Tensor<T>,
    w: &'a Tensor<T>,
    b: &Tensor<T>,
) -> (Tensor<T>, AffineReluCache<'a, T>) {
    let (a, affine) = affine::forward(x, w, b);
    let (out, relu) = relu::forward(a);
    (out, AffineReluCache { affine, relu })
}

/// Returns `(dx, dw, db)` for the affine transform.
pub fn affine_relu_backward<T: Scalar>(
    dout: &Tensor<T>,
    cache: &AffineReluCache<'_, T>,
) -> (Tensor<T>, Tensor<T>, Tensor<T>) {
    let da = relu::backward(dout.clone(), &cache.relu);
    affine::backward(&da, &cache.affine)
}
