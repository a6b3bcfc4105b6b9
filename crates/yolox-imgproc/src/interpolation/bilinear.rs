use yolox_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation with a constant border.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `border` - The value of the taps outside the image.
///
/// # Returns
///
/// The interpolated pixel values.
pub(crate) fn bilinear_interpolation<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
    border: &[f32; C],
) -> [f32; C] {
    let (rows, cols) = (image.rows() as isize, image.cols() as isize);

    let u0 = u.floor();
    let v0 = v.floor();
    let frac_u = u - u0;
    let frac_v = v - v0;
    let (iu0, iv0) = (u0 as isize, v0 as isize);

    // everything outside the one-pixel ring around the image is pure border
    if iu0 < -1 || iv0 < -1 || iu0 >= cols || iv0 >= rows {
        return *border;
    }

    let data = image.as_slice();
    let tap = |iu: isize, iv: isize, k: usize| -> f32 {
        if iu < 0 || iv < 0 || iu >= cols || iv >= rows {
            border[k]
        } else {
            data[(iv as usize * cols as usize + iu as usize) * C + k].into()
        }
    };

    let w00 = (1.0 - frac_u) * (1.0 - frac_v);
    let w01 = frac_u * (1.0 - frac_v);
    let w10 = (1.0 - frac_u) * frac_v;
    let w11 = frac_u * frac_v;

    let mut pixel = [0.0; C];
    for (k, p) in pixel.iter_mut().enumerate() {
        *p = tap(iu0, iv0, k) * w00
            + tap(iu0 + 1, iv0, k) * w01
            + tap(iu0, iv0 + 1, k) * w10
            + tap(iu0 + 1, iv0 + 1, k) * w11;
    }

    pixel
}
