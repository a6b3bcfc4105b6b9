use num_traits::Float;
use yolox_image::{Image, ImageDtype, ImageError};

use crate::interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Inverts a 2x3 affine transformation matrix.
///
/// Arguments:
///
/// * `m` - The 2x3 affine transformation matrix.
///
/// Returns:
///
/// The inverted 2x3 affine transformation matrix.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] when the linear part is singular.
pub fn invert_affine_transform(m: &[f32; 6]) -> Result<[f32; 6], ImageError> {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    let determinant = a * e - b * d;
    if determinant == 0.0 {
        return Err(ImageError::CannotComputeDeterminant);
    }
    let inv_determinant = 1.0 / determinant;

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    Ok([new_a, new_b, new_c, new_d, new_e, new_f])
}

/// Returns a 2x3 rotation matrix for a 2D rotation around a center point.
///
/// The rotation matrix is defined as:
///
/// | alpha  beta  tx |
/// | -beta  alpha ty |
///
/// where:
///
/// alpha = scale * cos(angle)
/// beta = scale * sin(angle)
/// tx = (1 - alpha) * center.x - beta * center.y
/// ty = beta * center.x + (1 - alpha) * center.y
///
/// A positive angle rotates counter-clockwise in image coordinates, as OpenCV does.
///
/// # Arguments
///
/// * `center` - The center point of the rotation.
/// * `angle` - The angle of rotation in degrees.
/// * `scale` - The scale factor.
///
/// The matrix is built in the precision of `T`; use `f64` to compose it with
/// other transforms before warping.
pub fn get_rotation_matrix2d<T: Float>(center: (T, T), angle: T, scale: T) -> [T; 6] {
    let angle = angle.to_radians();
    let alpha = scale * angle.cos();
    let beta = scale * angle.sin();

    let tx = (T::one() - alpha) * center.0 - beta * center.1;
    let ty = beta * center.0 + (T::one() - alpha) * center.1;

    [alpha, beta, tx, -beta, alpha, ty]
}

/// Applies an affine transformation to a point.
fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Applies an affine transformation to an image.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (new_height, new_width, channels).
/// * `m` - The 2x3 affine transformation matrix src -> dst.
/// * `interpolation` - The interpolation mode to use.
/// * `border` - The constant value for pixels mapped from outside `src`.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] if `m` cannot be inverted.
pub fn warp_affine<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
    border: &[f32; C],
) -> Result<(), ImageError> {
    // invert affine transform matrix to find corresponding positions in src from dst
    let m_inv = invert_affine_transform(m)?;

    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        Ok(transform_point(x as f32, y as f32, &m_inv))
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
    fn warp_affine_smoke_ch3() -> Result<(), ImageError> {
        let image = Image::<_, 3>::new(
            ImageSize {
                width: 4,
                height: 5,
            },
            vec![0f32; 4 * 5 * 3],
        )?;

        let new_size = ImageSize {
            width: 2,
            height: 3,
        };

        let mut image_transformed = Image::<_, 3>::from_size_val(new_size, 0.0)?;

        super::warp_affine(
            &image,
            &mut image_transformed,
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            InterpolationMode::Bilinear,
            &[0.0; 3],
        )?;

        assert_eq!(image_transformed.num_channels(), 3);
        assert_eq!(image_transformed.size().width, 2);
        assert_eq!(image_transformed.size().height, 3);

        Ok(())
    }

    #[test]
    fn warp_affine_correctness_identity() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 4,
                height: 5,
            },
            (0..20).map(|x| x as f32).collect(),
        )?;

        let mut image_transformed = Image::<_, 1>::from_size_val(image.size(), 0.0)?;

        super::warp_affine(
            &image,
            &mut image_transformed,
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            InterpolationMode::Nearest,
            &[0.0],
        )?;

        assert_eq!(image_transformed.as_slice(), image.as_slice());
        assert_eq!(image_transformed.size(), image.size());

        Ok(())
    }

    #[test]
    fn warp_affine_translation_fills_border() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![1, 2, 3],
        )?;

        let mut image_transformed = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        // shift right by one pixel
        super::warp_affine(
            &image,
            &mut image_transformed,
            &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            InterpolationMode::Bilinear,
            &[114.0],
        )?;

        assert_eq!(image_transformed.as_slice(), &[114, 1, 2]);

        Ok(())
    }

    #[test]
    fn warp_affine_correctness_rot90() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0f32, 1.0f32, 2.0f32, 3.0f32],
        )?;

        let mut image_transformed = Image::<_, 1>::from_size_val(image.size(), 0.0)?;

        super::warp_affine(
            &image,
            &mut image_transformed,
            &super::get_rotation_matrix2d((0.5f32, 0.5), 90.0, 1.0),
            InterpolationMode::Nearest,
            &[0.0],
        )?;

        assert_eq!(
            image_transformed.as_slice(),
            &[1.0f32, 3.0f32, 0.0f32, 2.0f32]
        );

        Ok(())
    }

    #[test]
    fn invert_singular() {
        assert_eq!(
            super::invert_affine_transform(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            Err(ImageError::CannotComputeDeterminant)
        );
    }
}
