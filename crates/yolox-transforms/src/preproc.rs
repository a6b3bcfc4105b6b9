use yolox_image::{Image, ImageSize};
use yolox_imgproc::resize::resize_linear;
use yolox_tensor::Tensor3;

use crate::error::TransformError;

/// Axes order turning an (H, W, C) buffer into (C, H, W).
pub const DEFAULT_SWAP: [usize; 3] = [2, 0, 1];

/// Gray level of the letterbox padding.
pub const PAD_VALUE: u8 = 114;

/// Compute the letterbox ratio and the size of the resized image.
///
/// `input_size` is `(height, width)`.
pub fn letterbox_size(src: ImageSize, input_size: (usize, usize)) -> (f64, ImageSize) {
    let r = (input_size.0 as f64 / src.height as f64).min(input_size.1 as f64 / src.width as f64);
    let resized = ImageSize {
        width: ((src.width as f64 * r) as usize).min(input_size.1),
        height: ((src.height as f64 * r) as usize).min(input_size.0),
    };
    (r, resized)
}

/// Resize an image keeping its aspect ratio and pad it to `input_size`.
///
/// The image is scaled by `r = min(H / h, W / w)` with bilinear interpolation,
/// copied to the top-left corner of a canvas filled with [`PAD_VALUE`] and
/// finally transposed with `swap`.
///
/// # Arguments
///
/// * `image` - The input image with shape (h, w, C).
/// * `input_size` - The target `(H, W)`.
/// * `swap` - Axes permutation applied to the (H, W, C) canvas.
///
/// # Returns
///
/// The padded image as `f32` and the ratio `r`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidCanvas`] if the target or the resized
/// image would have no pixels, and a tensor error if `swap` is not a
/// permutation.
///
/// # Example
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_transforms::preproc::{preproc, DEFAULT_SWAP};
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 50, height: 100 }, 0).unwrap();
/// let (padded, r) = preproc(&image, (640, 640), DEFAULT_SWAP).unwrap();
///
/// assert_eq!(padded.shape, [3, 640, 640]);
/// assert_eq!(r, 6.4);
/// assert_eq!(padded.get([0, 639, 319]), Some(&0.0));
/// assert_eq!(padded.get([0, 0, 320]), Some(&114.0));
/// ```
pub fn preproc<const C: usize>(
    image: &Image<u8, C>,
    input_size: (usize, usize),
    swap: [usize; 3],
) -> Result<(Tensor3<f32>, f64), TransformError> {
    let (height, width) = input_size;
    if height == 0 || width == 0 {
        return Err(TransformError::InvalidCanvas {
            width: width as i64,
            height: height as i64,
        });
    }

    let (r, resized_size) = letterbox_size(image.size(), input_size);
    if resized_size.width == 0 || resized_size.height == 0 {
        return Err(TransformError::InvalidCanvas {
            width: resized_size.width as i64,
            height: resized_size.height as i64,
        });
    }

    let mut resized = Image::<u8, C>::from_size_val(resized_size, 0)?;
    resize_linear(image, &mut resized)?;

    let mut padded = Image::<u8, C>::from_size_val(ImageSize { width, height }, PAD_VALUE)?;
    let row_len = resized_size.width * C;
    padded
        .as_slice_mut()
        .chunks_exact_mut(width * C)
        .zip(resized.as_slice().chunks_exact(row_len))
        .for_each(|(dst_row, src_row)| {
            dst_row[..row_len].copy_from_slice(src_row);
        });

    let padded = padded.into_tensor().permute_axes(swap)?;

    Ok((padded.map(|&v| v as f32), r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_portrait() -> Result<(), TransformError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 50,
                height: 100,
            },
            10,
        )?;
        let (padded, r) = preproc(&image, (640, 640), DEFAULT_SWAP)?;
        assert_eq!(r, 6.4);
        assert_eq!(padded.shape, [3, 640, 640]);

        for c in 0..3 {
            for y in 0..640 {
                for x in 0..640 {
                    let expected = if x < 320 { 10.0 } else { 114.0 };
                    assert_eq!(padded.get([c, y, x]), Some(&expected));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn letterbox_landscape_pads_bottom() -> Result<(), TransformError> {
        let image = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 8,
                height: 2,
            },
            3,
        )?;
        let (padded, r) = preproc(&image, (8, 4), DEFAULT_SWAP)?;
        assert_eq!(r, 0.5);
        assert_eq!(padded.shape, [1, 8, 4]);
        assert_eq!(padded.get([0, 0, 3]), Some(&3.0));
        assert_eq!(padded.get([0, 1, 0]), Some(&114.0));
        Ok(())
    }

    #[test]
    fn custom_swap_keeps_hwc() -> Result<(), TransformError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 1,
                height: 1,
            },
            vec![1, 2, 3],
        )?;
        let (padded, _) = preproc(&image, (1, 2), [0, 1, 2])?;
        assert_eq!(padded.shape, [1, 2, 3]);
        assert_eq!(padded.as_slice(), &[1.0, 2.0, 3.0, 114.0, 114.0, 114.0]);
        Ok(())
    }

    #[test]
    fn rejects_empty_target() -> Result<(), TransformError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0,
        )?;
        assert_eq!(
            preproc(&image, (0, 4), DEFAULT_SWAP),
            Err(TransformError::InvalidCanvas {
                width: 4,
                height: 0
            })
        );
        Ok(())
    }
}
