use num_traits::{AsPrimitive, Float};
use rand::Rng;

use yolox_image::Image;
use yolox_imgproc::flip::horizontal_flip;

use crate::error::TransformError;

/// Flip the image horizontally with probability `prob` and remap the boxes.
///
/// Boxes are in corner format; the flipped box of `[x1, y1, x2, y2]` is
/// `[w - x2, y1, w - x1, y2]`, so `x1 <= x2` still holds.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use yolox_image::{Image, ImageSize};
/// use yolox_transforms::mirror::mirror;
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let image = Image::<u8, 1>::new(ImageSize { width: 3, height: 1 }, vec![1, 2, 3]).unwrap();
/// let mut boxes = [[0.0, 0.0, 1.0, 1.0]];
///
/// let flipped = mirror(&mut rng, image, &mut boxes, 1.0).unwrap();
/// assert_eq!(flipped.as_slice(), &[3, 2, 1]);
/// assert_eq!(boxes, [[2.0, 0.0, 3.0, 1.0]]);
/// ```
pub fn mirror<R, T, const C: usize>(
    rng: &mut R,
    image: Image<u8, C>,
    boxes: &mut [[T; 4]],
    prob: f64,
) -> Result<Image<u8, C>, TransformError>
where
    R: Rng + ?Sized,
    T: Float + 'static,
    usize: AsPrimitive<T>,
{
    if rng.random::<f64>() >= prob {
        return Ok(image);
    }

    let width: T = image.width().as_();
    for b in boxes.iter_mut() {
        let (x1, x2) = (b[0], b[2]);
        b[0] = width - x2;
        b[2] = width - x1;
    }

    Ok(horizontal_flip(&image)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use yolox_image::ImageSize;

    #[test]
    fn never_flips_with_zero_prob() -> Result<(), TransformError> {
        let mut rng = StdRng::seed_from_u64(1);
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1, 2, 3, 4, 5, 6],
        )?;
        let mut boxes = [[0.0f32, 0.0, 1.0, 1.0]];
        for _ in 0..20 {
            let out = mirror(&mut rng, image.clone(), &mut boxes, 0.0)?;
            assert_eq!(out, image);
        }
        assert_eq!(boxes, [[0.0, 0.0, 1.0, 1.0]]);
        Ok(())
    }

    #[test]
    fn flip_keeps_corner_order() -> Result<(), TransformError> {
        let mut rng = StdRng::seed_from_u64(1);
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![1, 2, 3, 4, 5, 6],
        )?;
        let mut boxes = [[0.25f64, 0.0, 1.5, 1.0], [0.0, 0.5, 2.0, 1.0]];
        let out = mirror(&mut rng, image, &mut boxes, 1.0)?;

        assert_eq!(out.as_slice(), &[4, 5, 6, 1, 2, 3]);
        assert_eq!(boxes, [[0.5, 0.0, 1.75, 1.0], [0.0, 0.5, 2.0, 1.0]]);
        Ok(())
    }
}
