use rayon::prelude::*;

use yolox_image::{Image, ImageError};

/// Bits of the fixed point interpolation weights.
const COEF_BITS: u32 = 11;

const COEF_SCALE: i32 = 1 << COEF_BITS;

/// Source taps and weight for one destination coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    i0: usize,
    i1: usize,
    frac: f32,
}

impl Tap {
    /// The two fixed point weights of the tap, summing to `COEF_SCALE`.
    fn coeffs(&self) -> [i32; 2] {
        let c0 = round_half_even((1.0 - self.frac) * COEF_SCALE as f32);
        [c0, COEF_SCALE - c0]
    }
}

fn round_half_even(x: f32) -> i32 {
    let r = x.round();
    if (r - x).abs() == 0.5 && r % 2.0 != 0.0 {
        (r - x.signum()) as i32
    } else {
        r as i32
    }
}

/// Compute the source taps along one axis using the OpenCV pixel-center
/// convention `src = (dst + 0.5) * scale - 0.5`, clamped to the edges.
fn linear_taps(src_len: usize, dst_len: usize) -> Vec<Tap> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let f = ((d as f64 + 0.5) * scale - 0.5) as f32;
            let mut s = f.floor() as isize;
            let mut frac = f - s as f32;
            if s < 0 {
                s = 0;
                frac = 0.0;
            }
            if s >= src_len as isize - 1 {
                s = src_len as isize - 1;
                frac = 0.0;
            }
            let i0 = s as usize;
            Tap {
                i0,
                i1: (i0 + 1).min(src_len - 1),
                frac,
            }
        })
        .collect()
}

/// Resize an 8-bit image with bilinear interpolation to the size of `dst`.
///
/// The arithmetic is OpenCV's `INTER_LINEAR` for 8-bit images: 11-bit integer
/// weights, a horizontal pass into 32-bit row buffers and a vertical pass that
/// drops 4 bits before each 16-bit multiply and rounds the sum.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, already allocated with the target size.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if `src` has no pixels while `dst` does.
///
/// # Example
///
/// ```
/// use yolox_image::{Image, ImageSize};
/// use yolox_imgproc::resize::resize_linear;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0u8; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let new_size = ImageSize {
///     width: 2,
///     height: 3,
/// };
///
/// let mut image_resized = Image::<u8, 3>::from_size_val(new_size, 0).unwrap();
///
/// resize_linear(&image, &mut image_resized).unwrap();
///
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
pub fn resize_linear<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if dst.is_empty() {
        return Ok(());
    }
    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }

    let xs = linear_taps(src.width(), dst.width())
        .iter()
        .map(|t| (t.i0, t.i1, t.coeffs()))
        .collect::<Vec<_>>();
    let ys = linear_taps(src.height(), dst.height())
        .iter()
        .map(|t| (t.i0, t.i1, t.coeffs()))
        .collect::<Vec<_>>();

    let src_stride = src.cols() * C;
    let src_data = src.as_slice();
    let dst_cols = dst.cols();

    // horizontal pass, scaled by COEF_SCALE
    let hresize = |y: usize, x: &(usize, usize, [i32; 2]), k: usize| -> i32 {
        let row = &src_data[y * src_stride..(y + 1) * src_stride];
        row[x.0 * C + k] as i32 * x.2[0] + row[x.1 * C + k] as i32 * x.2[1]
    };

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * dst_cols)
        .zip(ys.par_iter())
        .for_each(|(dst_row, &(y0, y1, beta))| {
            dst_row
                .chunks_exact_mut(C)
                .zip(xs.iter())
                .for_each(|(dst_pixel, tx)| {
                    for (k, d) in dst_pixel.iter_mut().enumerate() {
                        let s0 = hresize(y0, tx, k) >> 4;
                        let s1 = hresize(y1, tx, k) >> 4;
                        let v = ((beta[0] * s0) >> 16) + ((beta[1] * s1) >> 16);
                        *d = ((v + 2) >> 2).clamp(0, 255) as u8;
                    }
                });
        });

    Ok(())
}
