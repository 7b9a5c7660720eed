//! Error types for model construction and evaluation

use thiserror::Error;

/// Everything that can go wrong when configuring or evaluating a network.
///
/// Layer primitives in [`crate::layers`] treat shape misuse as programmer
/// error and panic; the model validates its inputs up front and reports
/// problems through this type instead.
#[derive(Debug, Error)]
pub enum ConvNetError {
    /// A construction precondition does not hold (e.g. even filter size).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An input tensor does not have the shape the model expects.
    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A batch with zero images was passed to the model.
    #[error("batch must contain at least one image")]
    EmptyBatch,

    /// Number of labels differs from number of images.
    #[error("batch has {images} images but {labels} labels")]
    BatchMismatch { images: usize, labels: usize },

    /// A label is not a valid class index.
    #[error("label {label} at index {index} is out of range for {num_classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvNetError>;
