use std::ops;

use yolox_tensor::{Tensor3, TensorError};

use crate::error::ImageError;

/// Image size in pixels
///
/// # Examples
///
/// ```
/// use yolox_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

/// Trait for image data types.
///
/// Send and Sync is required for the rayon row iterators.
pub trait ImageDtype: Copy + Default + Into<f32> + Send + Sync {
    /// Convert a f32 value to the image data type.
    fn from_f32(x: f32) -> Self;
}

impl ImageDtype for f32 {
    fn from_f32(x: f32) -> Self {
        x
    }
}

impl ImageDtype for u8 {
    fn from_f32(x: f32) -> Self {
        x.round().clamp(0.0, 255.0) as u8
    }
}

/// Represents an image with pixel data.
///
/// The image is represented as a 3D Tensor with shape (H, W, C), where H is the height of the image,
/// W is the width and C the number of channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize>(pub Tensor3<T>);

/// helper to deference the inner tensor
impl<T, const CHANNELS: usize> ops::Deref for Image<T, CHANNELS> {
    type Target = Tensor3<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// helper to deference the inner tensor
impl<T, const CHANNELS: usize> ops::DerefMut for Image<T, CHANNELS> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use yolox_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.width * size.height * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.width * size.height * CHANNELS,
            ));
        }

        Ok(Self(Tensor3::from_shape_vec(
            [size.height, size.width, CHANNELS],
            data,
        )?))
    }

    /// Create a new image with the given size filled with `val`.
    ///
    /// ```
    /// use yolox_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     114u8,
    /// ).unwrap();
    ///
    /// assert_eq!(image.get([19, 9, 2]), Some(&114));
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * CHANNELS];
        Image::new(size, data)
    }

    /// Build an image from an (H, W, C) tensor.
    ///
    /// # Errors
    ///
    /// If the last dimension of the tensor is not `CHANNELS`, an error is returned.
    pub fn from_tensor(tensor: Tensor3<T>) -> Result<Self, ImageError> {
        let [height, width, channels] = tensor.shape;
        if channels != CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(channels, CHANNELS));
        }
        Image::new(ImageSize { width, height }, tensor.into_vec())
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.shape[1],
            height: self.shape[0],
        }
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.shape[1]
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.shape[0]
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Returns `true` when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Cast the pixel data to a different type and scale it.
    ///
    /// # Errors
    ///
    /// If the pixel data cannot be cast to the new type, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use yolox_image::{Image, ImageSize};
    ///
    /// let image_u8 = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         height: 2,
    ///         width: 1,
    ///     },
    ///     vec![0u8, 0, 255, 0, 0, 255],
    /// ).unwrap();
    ///
    /// let image_f32 = image_u8.cast_and_scale::<f32>(1. / 255.0).unwrap();
    ///
    /// assert_eq!(image_f32.get([1, 0, 2]), Some(&1.0f32));
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast + std::ops::Mul<Output = U> + Copy,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .as_slice()
            .iter()
            .map(|&x| {
                let xu = U::from(x).ok_or(ImageError::CastError)?;
                Ok(xu * scale)
            })
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size(), casted_data)
    }

    /// Consume the image and return the underlying (H, W, C) tensor.
    pub fn into_tensor(self) -> Tensor3<T> {
        self.0
    }

    /// Copy the image into a channel-first (C, H, W) tensor.
    ///
    /// ```
    /// use yolox_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 2>::new(
    ///     ImageSize { width: 2, height: 1 },
    ///     vec![1, 2, 3, 4],
    /// ).unwrap();
    ///
    /// let chw = image.to_chw().unwrap();
    /// assert_eq!(chw.shape, [2, 1, 2]);
    /// assert_eq!(chw.as_slice(), &[1, 3, 2, 4]);
    /// ```
    pub fn to_chw(&self) -> Result<Tensor3<T>, TensorError>
    where
        T: Clone,
    {
        self.0.permute_axes([2, 0, 1])
    }
}
