use rayon::{iter::ParallelIterator, slice::ParallelSliceMut};
use yolox_image::{Image, ImageError};

/// Flip the input image horizontally.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
///
/// # Returns
///
/// The flipped image.
///
/// # Example
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_imgproc::flip::horizontal_flip;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize {
///         width: 3,
///         height: 1,
///     },
///     vec![1, 2, 3],
/// )
/// .unwrap();
///
/// let flipped = horizontal_flip(&image).unwrap();
///
/// assert_eq!(flipped.as_slice(), &[3, 2, 1]);
/// ```
pub fn horizontal_flip<T, const C: usize>(src: &Image<T, C>) -> Result<Image<T, C>, ImageError>
where
    T: Clone + Send + Sync,
{
    let mut dst = src.clone();
    let cols = src.cols();
    if src.is_empty() {
        return Ok(dst);
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .for_each(|row| {
            let mut i = 0;
            let mut j = cols - 1;
            while i < j {
                for c in 0..C {
                    row.swap(i * C + c, j * C + c);
                }
                i += 1;
                j -= 1;
            }
        });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use yolox_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_hflip() -> Result<(), ImageError> {
        let image = Image::<u8, 2>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        )?;
        let flipped = super::horizontal_flip(&image)?;
        assert_eq!(
            flipped.as_slice(),
            &[4, 5, 2, 3, 0, 1, 10, 11, 8, 9, 6, 7]
        );

        let twice = super::horizontal_flip(&flipped)?;
        assert_eq!(twice, image);
        Ok(())
    }

    #[test]
    fn test_hflip_empty() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 0,
                height: 0,
            },
            vec![],
        )?;
        assert!(super::horizontal_flip(&image)?.is_empty());
        Ok(())
    }
}
