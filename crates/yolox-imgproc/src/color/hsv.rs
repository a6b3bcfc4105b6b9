use crate::parallel;
use yolox_image::{Image, ImageError};

const HSV_SHIFT: i32 = 12;

/// Hue range of the 8-bit representation (degrees / 2).
pub(crate) const HUE_RANGE: i32 = 180;

// sector -> (b, g, r) indices into [v, v(1-s), v(1-sf), v(1-s(1-f))]
const SECTOR_DATA: [[usize; 3]; 6] = [
    [1, 3, 0],
    [1, 0, 2],
    [3, 0, 1],
    [0, 2, 1],
    [0, 1, 3],
    [2, 1, 0],
];

fn division_tables() -> ([i32; 256], [i32; 256]) {
    let mut sdiv = [0i32; 256];
    let mut hdiv = [0i32; 256];
    for i in 1..256 {
        sdiv[i] = ((255 << HSV_SHIFT) as f64 / i as f64).round() as i32;
        hdiv[i] = ((HUE_RANGE << HSV_SHIFT) as f64 / (6.0 * i as f64)).round() as i32;
    }
    (sdiv, hdiv)
}

/// Convert an 8-bit BGR image to 8-bit HSV.
///
/// The output follows the OpenCV 8-bit convention and uses the same fixed
/// point arithmetic, so lookup tables built for OpenCV HSV apply unchanged:
///
/// * H: hue in [0, 180), i.e. degrees / 2.
/// * S: saturation in [0, 255].
/// * V: value in [0, 255].
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `src` and `dst` sizes differ.
///
/// # Example
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_imgproc::color::hsv_from_bgr_u8;
///
/// // pure red in BGR order
/// let image = Image::<u8, 3>::new(ImageSize { width: 1, height: 1 }, vec![0, 0, 255]).unwrap();
/// let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// hsv_from_bgr_u8(&image, &mut hsv).unwrap();
///
/// assert_eq!(hsv.as_slice(), &[0, 255, 255]);
/// ```
pub fn hsv_from_bgr_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (sdiv, hdiv) = division_tables();
    let round = 1 << (HSV_SHIFT - 1);

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let b = src_pixel[0] as i32;
        let g = src_pixel[1] as i32;
        let r = src_pixel[2] as i32;

        let v = b.max(g).max(r);
        let vmin = b.min(g).min(r);
        let diff = v - vmin;

        let s = (diff * sdiv[v as usize] + round) >> HSV_SHIFT;

        let mut h = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        h = (h * hdiv[diff as usize] + round) >> HSV_SHIFT;
        if h < 0 {
            h += HUE_RANGE;
        }

        dst_pixel[0] = h as u8;
        dst_pixel[1] = s as u8;
        dst_pixel[2] = v as u8;
    });

    Ok(())
}

/// Convert an 8-bit HSV image (OpenCV convention, H in [0, 180)) back to BGR.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `src` and `dst` sizes differ.
pub fn bgr_from_hsv_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let hscale = 6.0f32 / HUE_RANGE as f32;

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let mut h = src_pixel[0] as f32;
        let s = src_pixel[1] as f32 * (1.0 / 255.0);
        let v = src_pixel[2] as f32 * (1.0 / 255.0);

        let (b, g, r) = if s == 0.0 {
            (v, v, v)
        } else {
            h *= hscale;
            while h >= 6.0 {
                h -= 6.0;
            }
            let mut sector = h.floor() as usize;
            h -= sector as f32;
            if sector >= 6 {
                sector = 0;
                h = 0.0;
            }

            let tab = [v, v * (1.0 - s), v * (1.0 - s * h), v * (1.0 - s * (1.0 - h))];
            let [bi, gi, ri] = SECTOR_DATA[sector];
            (tab[bi], tab[gi], tab[ri])
        };

        dst_pixel[0] = (b * 255.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[1] = (g * 255.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[2] = (r * 255.0).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}
