use yolox_image::{Image, ImageDtype};

/// Kernel for nearest neighbor interpolation with a constant border.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `border` - The value returned when the nearest pixel is outside the image.
///
/// # Returns
///
/// The interpolated pixel values.
pub(crate) fn nearest_neighbor_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
    border: &[f32; C],
) -> [f32; C] {
    let (rows, cols) = (image.rows() as isize, image.cols() as isize);

    let iu = u.round() as isize;
    let iv = v.round() as isize;

    if iu < 0 || iv < 0 || iu >= cols || iv >= rows {
        return *border;
    }

    let base = (iv as usize * cols as usize + iu as usize) * C;
    let src = &image.as_slice()[base..base + C];

    let mut pixel = [0.0; C];
    for (p, &s) in pixel.iter_mut().zip(src.iter()) {
        *p = s.into();
    }

    pixel
}
