use super::bilinear::bilinear_interpolation;
use super::nearest::nearest_neighbor_interpolation;
use yolox_image::{Image, ImageDtype};

/// Interpolation mode for the resize and warp operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
/// * `border` - The value used for taps outside the image.
///
/// # Returns
///
/// The interpolated pixel values, one per channel.
pub fn interpolate_pixel<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
    border: &[f32; C],
) -> [f32; C] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v, border),
        InterpolationMode::Nearest => nearest_neighbor_interpolation(image, u, v, border),
    }
}
