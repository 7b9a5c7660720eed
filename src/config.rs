//! Network configuration
//!
//! [`ConvNetConfig`] holds the construction parameters of a
//! [`ThreeLayerConvNet`](crate::convnet::ThreeLayerConvNet). It can be built
//! in code (every field has a default) or parsed from a JSON file.
//!
//! # Example
//!
//! ```json
//! {
//!   "input_dim": [3, 16, 16],
//!   "num_filters": 3,
//!   "filter_size": 3,
//!   "hidden_dim": 7,
//!   "num_classes": 5,
//!   "weight_scale": 0.01,
//!   "reg": 0.0,
//!   "precision": "f64"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConvNetError, Result};

/// Storage precision of all parameters and activations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    F32,
    F64,
}

/// Construction parameters for a three-layer convolutional network.
///
/// Missing JSON fields take the values of [`ConvNetConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvNetConfig {
    /// Input image size as `[channels, height, width]`
    pub input_dim: [usize; 3],

    /// Number of convolution filters
    pub num_filters: usize,

    /// Side length of the square filters; must be odd
    pub filter_size: usize,

    /// Width of the hidden affine layer
    pub hidden_dim: usize,

    /// Number of class scores produced
    pub num_classes: usize,

    /// Standard deviation of the Gaussian weight initialization
    pub weight_scale: f64,

    /// L2 regularization strength
    pub reg: f64,

    /// Storage precision
    pub precision: Precision,
}

impl Default for ConvNetConfig {
    fn default() -> Self {
        Self {
            input_dim: [3, 32, 32],
            num_filters: 32,
            filter_size: 7,
            hidden_dim: 100,
            num_classes: 10,
            weight_scale: 1e-3,
            reg: 0.0,
            precision: Precision::F32,
        }
    }
}

impl ConvNetConfig {
    /// Spatial size `(H/2, W/2)` after the 2x2 max pool.
    pub fn pooled_dims(&self) -> (usize, usize) {
        (self.input_dim[1] / 2, self.input_dim[2] / 2)
    }

    /// Input width of the hidden affine layer: `F * H/2 * W/2`.
    pub fn flattened_dim(&self) -> usize {
        let (ph, pw) = self.pooled_dims();
        self.num_filters * ph * pw
    }

    /// Checks every construction precondition.
    ///
    /// Odd spatial dimensions are rejected rather than silently truncated by
    /// the pooling layer.
    pub fn validate(&self) -> Result<()> {
        let [c, h, w] = self.input_dim;
        let positive = [
            ("input channels", c),
            ("input height", h),
            ("input width", w),
            ("num_filters", self.num_filters),
            ("filter_size", self.filter_size),
            ("hidden_dim", self.hidden_dim),
            ("num_classes", self.num_classes),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(invalid(format!("{name} must be positive")));
            }
        }

        if self.filter_size % 2 == 0 {
            return Err(invalid(format!(
                "filter_size must be odd, got {}",
                self.filter_size
            )));
        }

        if h % 2 != 0 || w % 2 != 0 {
            return Err(invalid(format!(
                "input height and width must be even for 2x2 pooling, got {h}x{w}"
            )));
        }

        if !self.weight_scale.is_finite() || self.weight_scale < 0.0 {
            return Err(invalid("weight_scale must be finite and non-negative"));
        }

        if !self.reg.is_finite() || self.reg < 0.0 {
            return Err(invalid("reg must be finite and non-negative"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConvNetError {
    ConvNetError::InvalidConfig(msg.into())
}

/// Loads and validates a network configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use rust_convnet::config::load_config;
///
/// let cfg = load_config("config/convnet_small.json").unwrap();
/// assert_eq!(cfg.filter_size % 2, 1);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ConvNetConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ConvNetConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ConvNetConfig::default();
        assert_eq!(cfg.input_dim, [3, 32, 32]);
        assert_eq!(cfg.flattened_dim(), 32 * 16 * 16);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_even_filter_rejected() {
        let cfg = ConvNetConfig {
            filter_size: 4,
            ..ConvNetConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConvNetError::InvalidConfig(_)));
        assert!(err.to_string().contains("filter_size must be odd"));
    }

    #[test]
    fn test_odd_spatial_rejected() {
        let cfg = ConvNetConfig {
            input_dim: [3, 15, 16],
            ..ConvNetConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_negative_reg_rejected() {
        let cfg = ConvNetConfig {
            reg: -0.1,
            ..ConvNetConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: ConvNetConfig = serde_json::from_str(r#"{ "num_filters": 4 }"#).unwrap();
        assert_eq!(cfg.num_filters, 4);
        assert_eq!(cfg.filter_size, 7);
        assert_eq!(cfg.precision, Precision::F32);
    }

    #[test]
    fn test_precision_lowercase() {
        let cfg: ConvNetConfig = serde_json::from_str(r#"{ "precision": "f64" }"#).unwrap();
        assert_eq!(cfg.precision, Precision::F64);
    }
}
