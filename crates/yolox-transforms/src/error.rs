use yolox_image::ImageError;
use yolox_tensor::TensorError;

/// An error type for the transforms module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TransformError {
    /// Error coming from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error coming from a tensor operation.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// The transform configuration is not usable.
    #[error("Invalid transform configuration: {0}")]
    InvalidConfig(String),

    /// The requested output canvas has no pixels.
    #[error("Invalid output canvas ({width}x{height})")]
    InvalidCanvas {
        /// Requested canvas width
        width: i64,
        /// Requested canvas height
        height: i64,
    },

    /// The operation needs a different number of channels.
    #[error("Expected {expected} channels, got {actual}")]
    InvalidChannels {
        /// Number of channels the operation works on
        expected: usize,
        /// Number of channels of the input
        actual: usize,
    },
}
