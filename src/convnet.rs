//! Three-layer convolutional network
//!
//! Architecture:
//!
//! ```text
//! conv - relu - 2x2 max pool - affine - relu - affine - softmax
//! ```
//!
//! The network operates on minibatches of shape `(N, C, H, W)`. Parameters
//! live in a [`Params`] record owned by the network; [`ThreeLayerConvNet::loss`]
//! returns gradients in the same record type so an optimizer can apply them
//! field by field.

use tracing::debug;

use crate::config::{ConvNetConfig, Precision};
use crate::error::{ConvNetError, Result};
use crate::layers::{
    affine, affine_relu_backward, affine_relu_forward, conv_relu_pool_backward,
    conv_relu_pool_forward, softmax_loss, ConvParams, PoolParams,
};
use crate::optimizers::Optimizer;
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use crate::utils::SimpleRng;

/// Names of the six learnable tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    W1,
    B1,
    W2,
    B2,
    W3,
    B3,
}

impl ParamName {
    pub const ALL: [ParamName; 6] = [
        ParamName::W1,
        ParamName::B1,
        ParamName::W2,
        ParamName::B2,
        ParamName::W3,
        ParamName::B3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::W1 => "W1",
            ParamName::B1 => "b1",
            ParamName::W2 => "W2",
            ParamName::B2 => "b2",
            ParamName::W3 => "W3",
            ParamName::B3 => "b3",
        }
    }

    /// Weights are L2-regularized, biases are not.
    pub fn is_weight(self) -> bool {
        matches!(self, ParamName::W1 | ParamName::W2 | ParamName::W3)
    }
}

impl std::fmt::Display for ParamName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learnable tensors of the network.
///
/// * `w1` - conv filters `(F, C, HH, WW)`
/// * `b1` - conv bias `(F,)`
/// * `w2` - hidden affine weights `(F * H/2 * W/2, hidden)`
/// * `b2` - hidden bias `(hidden,)`
/// * `w3` - output affine weights `(hidden, classes)`
/// * `b3` - output bias `(classes,)`
#[derive(Debug, Clone, PartialEq)]
pub struct Params<T> {
    pub w1: Tensor<T>,
    pub b1: Tensor<T>,
    pub w2: Tensor<T>,
    pub b2: Tensor<T>,
    pub w3: Tensor<T>,
    pub b3: Tensor<T>,
}

/// Gradients share the parameter layout: `grads.w1` is `dLoss/dW1`.
pub type Gradients<T> = Params<T>;

impl<T: Scalar> Params<T> {
    pub fn get(&self, name: ParamName) -> &Tensor<T> {
        match name {
            ParamName::W1 => &self.w1,
            ParamName::B1 => &self.b1,
            ParamName::W2 => &self.w2,
            ParamName::B2 => &self.b2,
            ParamName::W3 => &self.w3,
            ParamName::B3 => &self.b3,
        }
    }

    pub fn get_mut(&mut self, name: ParamName) -> &mut Tensor<T> {
        match name {
            ParamName::W1 => &mut self.w1,
            ParamName::B1 => &mut self.b1,
            ParamName::W2 => &mut self.w2,
            ParamName::B2 => &mut self.b2,
            ParamName::W3 => &mut self.w3,
            ParamName::B3 => &mut self.b3,
        }
    }

    /// `(name, tensor)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamName, &Tensor<T>)> {
        ParamName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    /// Zero tensors with identical shapes.
    pub fn zeros_like(&self) -> Self {
        Self {
            w1: Tensor::zeros_like(&self.w1),
            b1: Tensor::zeros_like(&self.b1),
            w2: Tensor::zeros_like(&self.w2),
            b2: Tensor::zeros_like(&self.b2),
            w3: Tensor::zeros_like(&self.w3),
            b3: Tensor::zeros_like(&self.b3),
        }
    }

    /// Total number of scalars across all six tensors.
    pub fn parameter_count(&self) -> usize {
        self.iter().map(|(_, t)| t.len()).sum()
    }

    /// `||W1||² + ||W2||² + ||W3||²`.
    pub fn weight_sum_squares(&self) -> T {
        self.w1.sum_squares() + self.w2.sum_squares() + self.w3.sum_squares()
    }
}

/// Result of a training-mode [`ThreeLayerConvNet::loss`] call.
#[derive(Debug, Clone)]
pub struct LossOutput<T> {
    /// `data_loss + reg_loss`
    pub loss: T,
    /// Mean softmax cross-entropy
    pub data_loss: T,
    /// `0.5 * reg * sum of squared weights`
    pub reg_loss: T,
    pub grads: Gradients<T>,
}

/// Convolutional classifier: conv-relu-pool, affine-relu, affine.
#[derive(Debug, Clone)]
pub struct ThreeLayerConvNet<T> {
    /// Learnable parameters; optimizers mutate them between `loss` calls.
    pub params: Params<T>,
    reg: T,
    input_dim: [usize; 3],
    num_classes: usize,
    conv_params: ConvParams,
    pool_params: PoolParams,
}

impl<T: Scalar> ThreeLayerConvNet<T> {
    /// Builds a network with Gaussian weights (std `weight_scale`) and zero
    /// biases.
    ///
    /// # Errors
    ///
    /// [`ConvNetError::InvalidConfig`] when `config` fails
    /// [`ConvNetConfig::validate`], e.g. for an even `filter_size`.
    pub fn new(config: &ConvNetConfig, rng: &mut SimpleRng) -> Result<Self> {
        config.validate()?;

        let [c, _, _] = config.input_dim;
        let f = config.num_filters;
        let k = config.filter_size;
        let scale = config.weight_scale;

        let params = Params {
            w1: Tensor::randn(&[f, c, k, k], scale, rng),
            b1: Tensor::zeros(&[f]),
            w2: Tensor::randn(&[config.flattened_dim(), config.hidden_dim], scale, rng),
            b2: Tensor::zeros(&[config.hidden_dim]),
            w3: Tensor::randn(&[config.hidden_dim, config.num_classes], scale, rng),
            b3: Tensor::zeros(&[config.num_classes]),
        };

        if config.precision != T::PRECISION {
            debug!(
                requested = ?config.precision,
                actual = ?T::PRECISION,
                "config precision differs from storage type"
            );
        }
        debug!(
            input_dim = ?config.input_dim,
            w1 = ?params.w1.shape(),
            w2 = ?params.w2.shape(),
            w3 = ?params.w3.shape(),
            parameters = params.parameter_count(),
            "initialized three-layer convnet"
        );

        Ok(Self {
            params,
            reg: T::of_f64(config.reg),
            input_dim: config.input_dim,
            num_classes: config.num_classes,
            conv_params: ConvParams::same(k),
            pool_params: PoolParams::default(),
        })
    }

    /// L2 regularization strength.
    pub fn reg(&self) -> T {
        self.reg
    }

    pub fn set_reg(&mut self, reg: T) {
        self.reg = reg;
    }

    /// `[C, H, W]` expected for every input image.
    pub fn input_dim(&self) -> [usize; 3] {
        self.input_dim
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// `0.5 * reg * (||W1||² + ||W2||² + ||W3||²)`.
    pub fn regularization_loss(&self) -> T {
        T::of_f64(0.5) * self.reg * self.params.weight_sum_squares()
    }

    /// Test-mode pass: raw class scores of shape `(N, num_classes)`.
    ///
    /// # Errors
    ///
    /// [`ConvNetError::EmptyBatch`] or [`ConvNetError::ShapeMismatch`] when
    /// `x` is not a non-empty `(N, C, H, W)` batch of the configured size.
    pub fn scores(&self, x: &Tensor<T>) -> Result<Tensor<T>> {
        self.check_batch(x)?;
        let p = &self.params;

        let (a1, _) = conv_relu_pool_forward(x, &p.w1, &p.b1, self.conv_params, self.pool_params);
        let (a2, _) = affine_relu_forward(&a1, &p.w2, &p.b2);
        let (scores, _) = affine::forward(&a2, &p.w3, &p.b3);
        Ok(scores)
    }

    /// Training-mode pass: loss and gradients for every parameter.
    ///
    /// # Errors
    ///
    /// Everything [`scores`](Self::scores) reports, plus
    /// [`ConvNetError::BatchMismatch`] and [`ConvNetError::LabelOutOfRange`]
    /// for bad labels. Inputs are validated before any computation.
    pub fn loss(&self, x: &Tensor<T>, y: &[usize]) -> Result<LossOutput<T>> {
        self.check_batch(x)?;
        self.check_labels(x.dim(0), y)?;
        let p = &self.params;

        let (a1, cache1) =
            conv_relu_pool_forward(x, &p.w1, &p.b1, self.conv_params, self.pool_params);
        let (a2, cache2) = affine_relu_forward(&a1, &p.w2, &p.b2);
        let (scores, cache3) = affine::forward(&a2, &p.w3, &p.b3);

        let (data_loss, dscores) = softmax_loss(&scores, y);
        let reg_loss = self.regularization_loss();
        let loss = data_loss + reg_loss;

        let (da2, mut dw3, db3) = affine::backward(&dscores, &cache3);
        let (da1, mut dw2, db2) = affine_relu_backward(&da2, &cache2);
        let (_, mut dw1, db1) = conv_relu_pool_backward(&da1, &cache1);

        dw3.add_scaled(self.reg, &p.w3);
        dw2.add_scaled(self.reg, &p.w2);
        dw1.add_scaled(self.reg, &p.w1);

        debug!(
            batch = x.dim(0),
            data_loss = data_loss.as_f64(),
            reg_loss = reg_loss.as_f64(),
            "computed loss"
        );

        Ok(LossOutput {
            loss,
            data_loss,
            reg_loss,
            grads: Params {
                w1: dw1,
                b1: db1,
                w2: dw2,
                b2: db2,
                w3: dw3,
                b3: db3,
            },
        })
    }

    /// Predicted class (argmax of scores) for each image.
    pub fn predict(&self, x: &Tensor<T>) -> Result<Vec<usize>> {
        Ok(self.scores(x)?.argmax_rows())
    }

    /// Fraction of images whose predicted class equals the label.
    pub fn accuracy(&self, x: &Tensor<T>, y: &[usize]) -> Result<f64> {
        self.check_batch(x)?;
        self.check_labels(x.dim(0), y)?;
        let predictions = self.predict(x)?;
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, l)| p == l)
            .count();
        Ok(correct as f64 / y.len() as f64)
    }

    /// Applies `grads` to every parameter through `optimizer`.
    ///
    /// # Panics
    ///
    /// Panics if a gradient's length differs from its parameter's.
    pub fn apply_gradients<O: Optimizer<T>>(&mut self, grads: &Gradients<T>, optimizer: &mut O) {
        for name in ParamName::ALL {
            optimizer.update(self.params.get_mut(name).data_mut(), grads.get(name).data());
        }
    }

    fn check_batch(&self, x: &Tensor<T>) -> Result<()> {
        let [c, h, w] = self.input_dim;
        if x.ndim() != 4 || x.shape()[1..] != [c, h, w] {
            let n = if x.ndim() > 0 { x.dim(0) } else { 0 };
            return Err(ConvNetError::ShapeMismatch {
                what: "input batch",
                expected: vec![n, c, h, w],
                actual: x.shape().to_vec(),
            });
        }
        if x.dim(0) == 0 {
            return Err(ConvNetError::EmptyBatch);
        }
        Ok(())
    }

    fn check_labels(&self, images: usize, y: &[usize]) -> Result<()> {
        if y.len() != images {
            return Err(ConvNetError::BatchMismatch {
                images,
                labels: y.len(),
            });
        }
        if let Some((index, &label)) = y.iter().enumerate().find(|&(_, &l)| l >= self.num_classes)
        {
            return Err(ConvNetError::LabelOutOfRange {
                index,
                label,
                num_classes: self.num_classes,
            });
        }
        Ok(())
    }
}

/// A network in whichever precision the config asked for.
#[derive(Debug, Clone)]
pub enum AnyConvNet {
    F32(ThreeLayerConvNet<f32>),
    F64(ThreeLayerConvNet<f64>),
}

/// Builds a network whose storage type follows `config.precision`.
pub fn build_model(config: &ConvNetConfig, rng: &mut SimpleRng) -> Result<AnyConvNet> {
    Ok(match config.precision {
        Precision::F32 => AnyConvNet::F32(ThreeLayerConvNet::new(config, rng)?),
        Precision::F64 => AnyConvNet::F64(ThreeLayerConvNet::new(config, rng)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ConvNetConfig {
        ConvNetConfig {
            input_dim: [2, 4, 4],
            num_filters: 3,
            filter_size: 3,
            hidden_dim: 5,
            num_classes: 4,
            weight_scale: 1e-1,
            reg: 0.0,
            precision: Precision::F64,
        }
    }

    #[test]
    fn test_param_names() {
        let names: Vec<&str> = ParamName::ALL.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["W1", "b1", "W2", "b2", "W3", "b3"]);
        assert!(ParamName::W2.is_weight());
        assert!(!ParamName::B2.is_weight());
    }

    #[test]
    fn test_parameter_count() {
        let mut rng = SimpleRng::new(1);
        let net = ThreeLayerConvNet::<f64>::new(&small_config(), &mut rng).unwrap();
        // 3*2*3*3 + 3 + (3*2*2)*5 + 5 + 5*4 + 4
        assert_eq!(net.params.parameter_count(), 54 + 3 + 60 + 5 + 20 + 4);
    }

    #[test]
    fn test_wrong_channel_count_is_shape_mismatch() {
        let mut rng = SimpleRng::new(1);
        let net = ThreeLayerConvNet::<f64>::new(&small_config(), &mut rng).unwrap();
        let x = Tensor::zeros(&[2, 3, 4, 4]);
        assert!(matches!(
            net.scores(&x),
            Err(ConvNetError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut rng = SimpleRng::new(1);
        let net = ThreeLayerConvNet::<f64>::new(&small_config(), &mut rng).unwrap();
        let x = Tensor::zeros(&[0, 2, 4, 4]);
        assert!(matches!(net.scores(&x), Err(ConvNetError::EmptyBatch)));
    }

    #[test]
    fn test_bad_labels_rejected() {
        let mut rng = SimpleRng::new(1);
        let net = ThreeLayerConvNet::<f64>::new(&small_config(), &mut rng).unwrap();
        let x = Tensor::zeros(&[2, 2, 4, 4]);

        assert!(matches!(
            net.loss(&x, &[0]),
            Err(ConvNetError::BatchMismatch {
                images: 2,
                labels: 1
            })
        ));
        assert!(matches!(
            net.loss(&x, &[0, 4]),
            Err(ConvNetError::LabelOutOfRange {
                index: 1,
                label: 4,
                num_classes: 4
            })
        ));
    }

    #[test]
    fn test_build_model_follows_precision() {
        let mut rng = SimpleRng::new(1);
        let cfg = small_config();
        assert!(matches!(build_model(&cfg, &mut rng), Ok(AnyConvNet::F64(_))));

        let cfg32 = ConvNetConfig {
            precision: Precision::F32,
            ..cfg
        };
        assert!(matches!(build_model(&cfg32, &mut rng), Ok(AnyConvNet::F32(_))));
    }
}
