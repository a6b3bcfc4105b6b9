use yolox_image::Image;
use yolox_imgproc::normalize::normalize_mean_std;
use yolox_tensor::Tensor3;

use crate::error::TransformError;

/// Per channel mean of the ImageNet training set, RGB order, in [0, 1].
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per channel standard deviation of the ImageNet training set, RGB order, in [0, 1].
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Scale a channel-first image to [0, 1] and optionally standardize it.
///
/// With `statistic_norm` each channel `c` becomes `(x / 255 - mean[c]) / std[c]`
/// using [`IMAGENET_MEAN`] and [`IMAGENET_STD`].
///
/// # Arguments
///
/// * `chw` - Image with shape (C, H, W) and values in [0, 255].
/// * `statistic_norm` - Apply the mean / std standardization.
///
/// # Errors
///
/// Returns [`TransformError::InvalidChannels`] if `statistic_norm` is set and
/// the image does not have three channels.
///
/// # Example
///
/// ```
/// use yolox_tensor::Tensor3;
/// use yolox_transforms::normalize::statistic_normalize_img;
///
/// let chw = Tensor3::from_shape_vec([1, 1, 2], vec![0.0, 255.0]).unwrap();
/// let out = statistic_normalize_img(&chw, false).unwrap();
/// assert_eq!(out.as_slice(), &[0.0, 1.0]);
/// ```
pub fn statistic_normalize_img(
    chw: &Tensor3<f32>,
    statistic_norm: bool,
) -> Result<Tensor3<f32>, TransformError> {
    if !statistic_norm {
        return Ok(chw.map(|&v| v / 255.0));
    }

    let channels = chw.shape[0];
    if channels != 3 {
        return Err(TransformError::InvalidChannels {
            expected: 3,
            actual: channels,
        });
    }

    let image = Image::<f32, 3>::from_tensor(chw.permute_axes([1, 2, 0])?)?;
    let scaled = image.cast_and_scale::<f32>(1.0 / 255.0)?;

    let mut normalized = Image::<f32, 3>::from_size_val(scaled.size(), 0.0)?;
    normalize_mean_std(&scaled, &mut normalized, &IMAGENET_MEAN, &IMAGENET_STD)?;

    Ok(normalized.to_chw()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scales_without_norm() -> Result<(), TransformError> {
        let chw = Tensor3::from_shape_vec([2, 1, 1], vec![51.0, 255.0])?;
        let out = statistic_normalize_img(&chw, false)?;
        assert_eq!(out.shape, [2, 1, 1]);
        assert_relative_eq!(out.as_slice()[0], 0.2, epsilon = 1e-6);
        assert_relative_eq!(out.as_slice()[1], 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn standardizes_per_channel() -> Result<(), TransformError> {
        // two pixels per channel
        let chw = Tensor3::from_shape_vec(
            [3, 1, 2],
            vec![0.0, 255.0, 127.5, 127.5, 255.0, 0.0],
        )?;
        let out = statistic_normalize_img(&chw, true)?;
        assert_eq!(out.shape, [3, 1, 2]);

        let expected = [
            (0.0 - 0.485) / 0.229,
            (1.0 - 0.485) / 0.229,
            (0.5 - 0.456) / 0.224,
            (0.5 - 0.456) / 0.224,
            (1.0 - 0.406) / 0.225,
            (0.0 - 0.406) / 0.225,
        ];
        for (a, b) in out.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b as f32, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn norm_needs_three_channels() -> Result<(), TransformError> {
        let chw = Tensor3::from_shape_vec([1, 2, 2], vec![0.0; 4])?;
        assert_eq!(
            statistic_normalize_img(&chw, true),
            Err(TransformError::InvalidChannels {
                expected: 3,
                actual: 1
            })
        );
        Ok(())
    }
}
