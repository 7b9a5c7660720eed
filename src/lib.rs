//! Three-layer convolutional classifier
//!
//! A small image classifier with explicit forward and backward passes:
//!
//! ```text
//! conv - relu - 2x2 max pool - affine - relu - affine - softmax
//! ```
//!
//! # Modules
//!
//! - `convnet`: the `ThreeLayerConvNet` model, its parameter record and loss
//! - `layers`: forward/backward primitives (conv, pool, affine, relu, softmax)
//! - `config`: construction parameters and JSON loading
//! - `gradient_check`: finite-difference gradient validation
//! - `optimizers`: optimizer trait and SGD
//! - `tensor`, `scalar`: n-d arrays and precision abstraction
//! - `utils`: deterministic RNG
//!
//! # Example
//!
//! ```
//! use rust_convnet::config::ConvNetConfig;
//! use rust_convnet::convnet::ThreeLayerConvNet;
//! use rust_convnet::tensor::Tensor;
//! use rust_convnet::utils::SimpleRng;
//!
//! let config = ConvNetConfig {
//!     input_dim: [1, 8, 8],
//!     num_filters: 2,
//!     filter_size: 3,
//!     hidden_dim: 6,
//!     num_classes: 3,
//!     ..ConvNetConfig::default()
//! };
//! let mut rng = SimpleRng::new(42);
//! let model = ThreeLayerConvNet::<f32>::new(&config, &mut rng).unwrap();
//!
//! let x = Tensor::zeros(&[4, 1, 8, 8]);
//! let scores = model.scores(&x).unwrap();
//! assert_eq!(scores.shape(), &[4, 3]);
//!
//! let out = model.loss(&x, &[0, 1, 2, 0]).unwrap();
//! assert_eq!(out.grads.w1.shape(), model.params.w1.shape());
//! ```

pub mod config;
pub mod convnet;
pub mod error;
pub mod gradient_check;
pub mod layers;
pub mod optimizers;
pub mod scalar;
pub mod tensor;
pub mod utils;

pub use config::{load_config, ConvNetConfig, Precision};
pub use convnet::{
    build_model, AnyConvNet, Gradients, LossOutput, ParamName, Params, ThreeLayerConvNet,
};
pub use error::{ConvNetError, Result};
pub use scalar::Scalar;
pub use tensor::Tensor;
