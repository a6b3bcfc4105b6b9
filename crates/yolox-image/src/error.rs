use yolox_tensor::TensorError;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the source and destination sizes differ.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the image has no pixels.
    #[error("Image is empty ({0}x{1})")]
    EmptyImage(usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the pixel data cannot be cast.
    #[error("Failed to cast image data")]
    CastError,

    /// Error when a transform matrix cannot be inverted.
    #[error("Cannot compute the determinant of a singular matrix")]
    CannotComputeDeterminant,

    /// Error coming from the underlying tensor.
    #[error(transparent)]
    TensorError(#[from] TensorError),
}
