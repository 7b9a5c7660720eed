//! Layer primitives
//!
//! Each layer is a pair of free functions: `forward` returns the output and
//! a cache, `backward` consumes the upstream gradient and that cache. Caches
//! that keep inputs around borrow them, so they cannot outlive the pass that
//! produced them.
//!
//! - `conv`: naive 2D convolution
//! - `pool`: max pooling
//! - `affine`: fully connected transform
//! - `relu`: rectified linear unit
//! - `softmax`: softmax and cross-entropy loss
//! - `fused`: conv-relu-pool and affine-relu sandwiches

pub mod affine;
pub mod conv;
pub mod fused;
pub mod pool;
pub mod relu;
pub mod softmax;

pub use conv::ConvParams;
pub use fused::{
    affine_relu_backward, affine_relu_forward, conv_relu_pool_backward, conv_relu_pool_forward,
    AffineReluCache, ConvReluPoolCache,
};
pub use pool::PoolParams;
pub use softmax::softmax_loss;
