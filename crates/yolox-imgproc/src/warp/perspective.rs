use crate::{
    interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode},
    parallel,
};

use yolox_image::{Image, ImageDtype, ImageError};

#[rustfmt::skip]
fn determinant3x3(m: &[f32; 9]) -> f32 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f32; 9]) -> [f32; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

fn inverse_perspective_matrix(m: &[f32; 9]) -> Result<[f32; 9], ImageError> {
    let det = determinant3x3(m);

    if det == 0.0 {
        return Err(ImageError::CannotComputeDeterminant);
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for (inv, a) in inv_m.iter_mut().zip(adj.iter()) {
        *inv = a * inv_det;
    }

    Ok(inv_m)
}

fn transform_point(x: f32, y: f32, m: &[f32; 9]) -> (f32, f32) {
    let w = m[6] * x + m[7] * y + m[8];
    let u = (m[0] * x + m[1] * y + m[2]) / w;
    let v = (m[3] * x + m[4] * y + m[5]) / w;
    (u, v)
}

/// Applies a perspective transformation to an image.
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (height, width, channels).
/// * `m` - The 3x3 perspective transformation matrix src -> dst, row-major.
/// * `interpolation` - The interpolation mode to use.
/// * `border` - The constant value for pixels mapped from outside `src`.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] if `m` is singular.
///
/// # Example
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_imgproc::interpolation::InterpolationMode;
/// use yolox_imgproc::warp::warp_perspective;
///
/// let src = Image::<f32, 1>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0.0f32; 4 * 5],
/// ).unwrap();
///
/// let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
///
/// let mut dst = Image::<f32, 1>::from_size_val(
///     ImageSize {
///         width: 2,
///         height: 3,
///     },
///     0.0,
/// ).unwrap();
///
/// warp_perspective(&src, &mut dst, &m, InterpolationMode::Bilinear, &[0.0]).unwrap();
///
/// assert_eq!(dst.size().width, 2);
/// assert_eq!(dst.size().height, 3);
/// ```
pub fn warp_perspective<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &[f32; 9],
    interpolation: InterpolationMode,
    border: &[f32; C],
) -> Result<(), ImageError> {
    let inv_m = inverse_perspective_matrix(m)?;

    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        Ok(transform_point(x as f32, y as f32, &inv_m))
    })?;

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        let pixel = interpolate_pixel(src, x, y, interpolation, border);
        for (d, &p) in dst_pixel.iter_mut().zip(pixel.iter()) {
            *d = T::from_f32(p);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use yolox_image::{Image, ImageError, ImageSize};

    use crate::interpolation::InterpolationMode;

    #[test]
    fn inverse_perspective_matrix() -> Result<(), ImageError> {
        let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let expected = [1.0, 0.0, 1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0];
        let inv_m = super::inverse_perspective_matrix(&m)?;
        assert_eq!(inv_m, expected);
        Ok(())
    }

    #[test]
    fn transform_point() {
        let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let (x, y) = super::transform_point(1.0, 1.0, &m);
        assert_eq!(x, 0.0);
        assert_eq!(y, 2.0);
    }

    #[test]
    fn transform_point_homogeneous() {
        // the homogeneous coordinate divides both outputs
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0];
        let (x, y) = super::transform_point(4.0, 6.0, &m);
        assert_eq!((x, y), (2.0, 3.0));
    }

    #[test]
    fn warp_perspective_hflip() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0],
        )?;

        let image_expected = vec![1.0, 0.0, 3.0, 2.0, 5.0, 4.0];

        // flip matrix
        let m = [-1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let mut image_transformed = Image::<_, 1>::from_size_val(image.size(), 0.0)?;

        super::warp_perspective(
            &image,
            &mut image_transformed,
            &m,
            InterpolationMode::Bilinear,
            &[0.0],
        )?;

        assert_eq!(image_transformed.as_slice(), image_expected);

        Ok(())
    }

    #[test]
    fn warp_perspective_shift() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 4,
                height: 4,
            },
            (0..16).map(|x| x as f32).collect(),
        )?;

        // shift left by 1 pixel
        let m = [1.0, 0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let image_expected = vec![
            1.0f32, 2.0, 3.0, 114.0, 5.0, 6.0, 7.0, 114.0, 9.0, 10.0, 11.0, 114.0, 13.0, 14.0,
            15.0, 114.0,
        ];

        let mut image_transformed = Image::<_, 1>::from_size_val(image.size(), 0.0)?;

        super::warp_perspective(
            &image,
            &mut image_transformed,
            &m,
            InterpolationMode::Bilinear,
            &[114.0],
        )?;

        assert_eq!(image_transformed.as_slice(), image_expected);

        Ok(())
    }
}
