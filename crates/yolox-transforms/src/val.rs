use yolox_image::Image;
use yolox_tensor::{Tensor2, Tensor3};

use crate::error::TransformError;
use crate::normalize::statistic_normalize_img;
use crate::preproc::{preproc, DEFAULT_SWAP};

/// The evaluation transform: letterbox only, no augmentation.
///
/// With `legacy` the channel order is reversed and the ImageNet mean / std
/// standardization is applied on top, as older checkpoints expect.
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_transforms::val::ValTransform;
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 64, height: 32 }, 40).unwrap();
/// let (chw, labels) = ValTransform::default().call(&image, (64, 64)).unwrap();
///
/// assert_eq!(chw.shape, [3, 64, 64]);
/// assert_eq!(chw.get([0, 0, 0]), Some(&40.0));
/// assert_eq!(labels.shape, [1, 5]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValTransform {
    swap: [usize; 3],
    legacy: bool,
}

impl Default for ValTransform {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ValTransform {
    /// Create the transform with the channel-first layout.
    pub fn new(legacy: bool) -> Self {
        Self::with_swap(DEFAULT_SWAP, legacy)
    }

    /// Create the transform with a custom axes permutation.
    pub fn with_swap(swap: [usize; 3], legacy: bool) -> Self {
        Self { swap, legacy }
    }

    /// Letterbox the image and return it with an all-zero `(1, 5)` label placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if the letterbox fails or, on the legacy path, if the
    /// first output axis does not hold three channels.
    pub fn call<const C: usize>(
        &self,
        image: &Image<u8, C>,
        input_size: (usize, usize),
    ) -> Result<(Tensor3<f32>, Tensor2<f32>), TransformError> {
        let (mut chw, _) = preproc(image, input_size, self.swap)?;

        if self.legacy {
            let n = chw.shape[0];
            let reversed = Tensor3::from_shape_fn(chw.shape, |[c, y, x]| {
                *chw.get_unchecked([n - 1 - c, y, x])
            });
            chw = statistic_normalize_img(&reversed, true)?;
        }

        Ok((chw, Tensor2::zeros([1, 5])))
    }
}
