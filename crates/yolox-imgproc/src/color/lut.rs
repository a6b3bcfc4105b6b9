use crate::parallel;
use yolox_image::{Image, ImageError};

/// Remap every channel of an 8-bit image through its own lookup table.
///
/// `dst[y, x, c] = luts[c][src[y, x, c]]`
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `src` and `dst` sizes differ.
///
/// # Example
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_imgproc::color::apply_lut;
///
/// let image = Image::<u8, 2>::new(ImageSize { width: 1, height: 1 }, vec![3, 7]).unwrap();
/// let mut out = Image::<u8, 2>::from_size_val(image.size(), 0).unwrap();
///
/// let identity: [u8; 256] = std::array::from_fn(|i| i as u8);
/// let inverted: [u8; 256] = std::array::from_fn(|i| 255 - i as u8);
///
/// apply_lut(&image, &mut out, &[identity, inverted]).unwrap();
/// assert_eq!(out.as_slice(), &[3, 248]);
/// ```
pub fn apply_lut<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    luts: &[[u8; 256]; C],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        src_pixel
            .iter()
            .zip(dst_pixel.iter_mut())
            .zip(luts.iter())
            .for_each(|((&src_val, dst_val), lut)| {
                *dst_val = lut[src_val as usize];
            });
    });

    Ok(())
}
