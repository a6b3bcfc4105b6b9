use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use yolox_image::Image;
use yolox_imgproc::color::{apply_lut, bgr_from_hsv_u8, hsv_from_bgr_u8};

use crate::error::TransformError;
use crate::uniform;

/// Maximum relative change applied to each HSV channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsvGains {
    /// Hue gain.
    pub hue: f64,
    /// Saturation gain.
    pub saturation: f64,
    /// Value gain.
    pub value: f64,
}

impl Default for HsvGains {
    fn default() -> Self {
        Self {
            hue: 0.015,
            saturation: 0.7,
            value: 0.4,
        }
    }
}

impl HsvGains {
    /// Draw the three multiplicative ratios `1 + uniform(-1, 1) * gain`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; 3] {
        [self.hue, self.saturation, self.value].map(|gain| uniform(rng, -1.0, 1.0) * gain + 1.0)
    }
}

/// Build the hue, saturation and value lookup tables for the given ratios.
///
/// Hue wraps around the 8-bit hue range of 180, saturation and value are
/// clipped to [0, 255]. Values are truncated towards zero.
///
/// # Example
///
/// ```
/// use yolox_transforms::hsv::hsv_luts;
///
/// let [hue, sat, val] = hsv_luts([1.0, 2.0, 0.5]);
/// assert_eq!(hue[179], 179);
/// assert_eq!(hue[200], 20);
/// assert_eq!(sat[100], 200);
/// assert_eq!(sat[200], 255);
/// assert_eq!(val[255], 127);
/// ```
pub fn hsv_luts(ratios: [f64; 3]) -> [[u8; 256]; 3] {
    let lut_hue = std::array::from_fn(|i| (i as f64 * ratios[0]).rem_euclid(180.0) as u8);
    let lut_sat = std::array::from_fn(|i| (i as f64 * ratios[1]).clamp(0.0, 255.0) as u8);
    let lut_val = std::array::from_fn(|i| (i as f64 * ratios[2]).clamp(0.0, 255.0) as u8);
    [lut_hue, lut_sat, lut_val]
}

/// Randomly jitter hue, saturation and value of a BGR image.
///
/// The image is taken by value and the jittered buffer is returned, so the
/// caller keeps a copy only when it needs the original afterwards.
///
/// # Arguments
///
/// * `rng` - The random number generator.
/// * `image` - The 8-bit BGR image.
/// * `gains` - The maximum relative change per channel.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use yolox_image::{Image, ImageSize};
/// use yolox_transforms::hsv::{augment_hsv, HsvGains};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 4, height: 4 }, 114).unwrap();
///
/// // gray pixels have no saturation, only the value channel moves
/// let out = augment_hsv(&mut rng, image, &HsvGains::default()).unwrap();
/// let px = out.as_slice();
/// assert!(px[0] == px[1] && px[1] == px[2]);
/// ```
pub fn augment_hsv<R: Rng + ?Sized>(
    rng: &mut R,
    mut image: Image<u8, 3>,
    gains: &HsvGains,
) -> Result<Image<u8, 3>, TransformError> {
    let ratios = gains.sample(rng);
    debug!(
        "augment_hsv: ratios=({:.4}, {:.4}, {:.4})",
        ratios[0], ratios[1], ratios[2]
    );

    let luts = hsv_luts(ratios);

    let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    hsv_from_bgr_u8(&image, &mut hsv)?;

    let mut hsv_jittered = Image::<u8, 3>::from_size_val(image.size(), 0)?;
    apply_lut(&hsv, &mut hsv_jittered, &luts)?;

    bgr_from_hsv_u8(&hsv_jittered, &mut image)?;

    Ok(image)
}
