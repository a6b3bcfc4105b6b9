//! Random affine / perspective augmentation of an image and its boxes.
//!
//! The transform is the product `M = T · S · R · C` applied right to left:
//!
//! * `C` moves the image center to the origin.
//! * `R` rotates by a random angle and scales by a random factor.
//! * `S` shears along x and y.
//! * `T` translates the result into the output canvas.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use yolox_image::{Image, ImageSize};
//! use yolox_transforms::boxes::Target;
//! use yolox_transforms::perspective::{random_perspective, RandomPerspectiveParams};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let image = Image::<u8, 3>::from_size_val(ImageSize { width: 64, height: 48 }, 50).unwrap();
//! let targets = [Target::new(10.0, 10.0, 40.0, 30.0, 1.0)];
//!
//! let (warped, kept) =
//!     random_perspective(&mut rng, &image, &targets, &RandomPerspectiveParams::default()).unwrap();
//!
//! assert_eq!(warped.size(), image.size());
//! assert!(kept.len() <= 1);
//! ```

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use yolox_image::{Image, ImageSize};
use yolox_imgproc::interpolation::InterpolationMode;
use yolox_imgproc::warp::{get_rotation_matrix2d, warp_affine, warp_perspective};

use crate::boxes::{box_candidates, BoxCandidateParams, Target};
use crate::error::TransformError;
use crate::uniform;

/// Value written to the canvas where the warped image has no source pixel.
pub const BORDER_VALUE: f32 = 114.0;

/// A 3x3 homogeneous transform, row major.
pub type Matrix3 = [[f64; 3]; 3];

const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Sampling ranges for [`random_perspective`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomPerspectiveParams {
    /// Rotation is sampled uniformly in `[-degrees, degrees]`.
    pub degrees: f64,
    /// Translation is sampled in `[0.5 - translate, 0.5 + translate]` of the canvas size.
    pub translate: f64,
    /// Scale is sampled uniformly in `[scale.0, scale.1]`.
    pub scale: (f64, f64),
    /// Both shear angles are sampled uniformly in `[-shear, shear]` degrees.
    pub shear: f64,
    /// Warp with the full 3x3 matrix instead of its affine part.
    pub perspective: bool,
    /// Rows and columns added on each side of the canvas, as `(y, x)`.
    ///
    /// Negative values crop the canvas.
    pub border: (i32, i32),
    /// Thresholds used to drop boxes after the warp.
    pub candidates: BoxCandidateParams,
}

impl Default for RandomPerspectiveParams {
    fn default() -> Self {
        Self {
            degrees: 10.0,
            translate: 0.1,
            scale: (0.1, 2.0),
            shear: 10.0,
            perspective: false,
            border: (0, 0),
            candidates: BoxCandidateParams::default(),
        }
    }
}

fn matmul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Compose the warp matrix from already sampled parameters.
///
/// # Arguments
///
/// * `src_size` - Size of the input image.
/// * `canvas` - Size of the output canvas.
/// * `angle` - Rotation in degrees, counter-clockwise.
/// * `scale` - Isotropic scale factor.
/// * `shear` - Shear angles `(x, y)` in degrees.
/// * `translation` - Position of the image center in the canvas, as a fraction of
///   the canvas `(width, height)`.
///
/// # Example
///
/// ```
/// use yolox_image::ImageSize;
/// use yolox_transforms::perspective::build_transform_matrix;
///
/// let size = ImageSize { width: 20, height: 10 };
/// let m = build_transform_matrix(size, size, 0.0, 1.0, (0.0, 0.0), (0.5, 0.5));
/// assert_eq!(m, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
/// ```
pub fn build_transform_matrix(
    src_size: ImageSize,
    canvas: ImageSize,
    angle: f64,
    scale: f64,
    shear: (f64, f64),
    translation: (f64, f64),
) -> Matrix3 {
    let mut c = IDENTITY;
    c[0][2] = -(src_size.width as f64) / 2.0;
    c[1][2] = -(src_size.height as f64) / 2.0;

    let rot = get_rotation_matrix2d((0.0, 0.0), angle, scale);
    let r = [
        [rot[0], rot[1], rot[2]],
        [rot[3], rot[4], rot[5]],
        [0.0, 0.0, 1.0],
    ];

    let mut s = IDENTITY;
    s[0][1] = shear.0.to_radians().tan();
    s[1][0] = shear.1.to_radians().tan();

    let mut t = IDENTITY;
    t[0][2] = translation.0 * canvas.width as f64;
    t[1][2] = translation.1 * canvas.height as f64;

    matmul(&t, &matmul(&s, &matmul(&r, &c)))
}

/// A sampled warp: the composed matrix and the scale factor it contains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineSample {
    /// The composed 3x3 transform.
    pub matrix: Matrix3,
    /// The sampled scale, used to compare box areas before and after.
    pub scale: f64,
}

impl AffineSample {
    /// Draw the warp parameters from `rng`.
    ///
    /// Values are drawn in a fixed order: angle, scale, shear x, shear y,
    /// translation x, translation y.
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        src_size: ImageSize,
        canvas: ImageSize,
        params: &RandomPerspectiveParams,
    ) -> Self {
        let angle = uniform(rng, -params.degrees, params.degrees);
        let scale = uniform(rng, params.scale.0, params.scale.1);
        let shear_x = uniform(rng, -params.shear, params.shear);
        let shear_y = uniform(rng, -params.shear, params.shear);
        let tx = uniform(rng, 0.5 - params.translate, 0.5 + params.translate);
        let ty = uniform(rng, 0.5 - params.translate, 0.5 + params.translate);

        debug!(
            "random_perspective: angle={angle:.3} scale={scale:.3} shear=({shear_x:.3}, {shear_y:.3}) translate=({tx:.3}, {ty:.3})"
        );

        Self {
            matrix: build_transform_matrix(
                src_size,
                canvas,
                angle,
                scale,
                (shear_x, shear_y),
                (tx, ty),
            ),
            scale,
        }
    }
}

/// Compute the output canvas size for an input size and a `(y, x)` border.
///
/// # Errors
///
/// Returns [`TransformError::InvalidCanvas`] if the canvas would have no pixels.
pub fn canvas_size(src_size: ImageSize, border: (i32, i32)) -> Result<ImageSize, TransformError> {
    let height = src_size.height as i64 + 2 * border.0 as i64;
    let width = src_size.width as i64 + 2 * border.1 as i64;
    if width <= 0 || height <= 0 {
        return Err(TransformError::InvalidCanvas { width, height });
    }
    Ok(ImageSize {
        width: width as usize,
        height: height as usize,
    })
}

/// Warp an image with an already sampled transform.
///
/// The warp is skipped when the matrix is the identity and the canvas has
/// the input size.
pub fn warp_with_matrix<const C: usize>(
    image: &Image<u8, C>,
    canvas: ImageSize,
    matrix: &Matrix3,
    perspective: bool,
) -> Result<Image<u8, C>, TransformError> {
    if canvas == image.size() && *matrix == IDENTITY {
        return Ok(image.clone());
    }

    let mut dst = Image::<u8, C>::from_size_val(canvas, 0)?;
    let border = [BORDER_VALUE; C];

    if perspective {
        let m = [
            matrix[0][0] as f32,
            matrix[0][1] as f32,
            matrix[0][2] as f32,
            matrix[1][0] as f32,
            matrix[1][1] as f32,
            matrix[1][2] as f32,
            matrix[2][0] as f32,
            matrix[2][1] as f32,
            matrix[2][2] as f32,
        ];
        warp_perspective(image, &mut dst, &m, InterpolationMode::Bilinear, &border)?;
    } else {
        let m = [
            matrix[0][0] as f32,
            matrix[0][1] as f32,
            matrix[0][2] as f32,
            matrix[1][0] as f32,
            matrix[1][1] as f32,
            matrix[1][2] as f32,
        ];
        warp_affine(image, &mut dst, &m, InterpolationMode::Bilinear, &border)?;
    }

    Ok(dst)
}

/// Transform boxes with `matrix` and return the enclosing axis aligned boxes,
/// clipped to the canvas.
///
/// Each box contributes its four corners; the perspective divide is only
/// applied when `perspective` is set.
pub fn transform_boxes(
    targets: &[Target],
    matrix: &Matrix3,
    canvas: ImageSize,
    perspective: bool,
) -> Vec<[f64; 4]> {
    let (width, height) = (canvas.width as f64, canvas.height as f64);

    targets
        .iter()
        .map(|t| {
            let [x1, y1, x2, y2] = t.bbox.map(f64::from);
            let corners = [(x1, y1), (x2, y2), (x1, y2), (x2, y1)];

            let mut xmin = f64::INFINITY;
            let mut ymin = f64::INFINITY;
            let mut xmax = f64::NEG_INFINITY;
            let mut ymax = f64::NEG_INFINITY;
            for (x, y) in corners {
                let mut u = matrix[0][0] * x + matrix[0][1] * y + matrix[0][2];
                let mut v = matrix[1][0] * x + matrix[1][1] * y + matrix[1][2];
                if perspective {
                    let w = matrix[2][0] * x + matrix[2][1] * y + matrix[2][2];
                    u /= w;
                    v /= w;
                }
                xmin = xmin.min(u);
                ymin = ymin.min(v);
                xmax = xmax.max(u);
                ymax = ymax.max(v);
            }

            [
                xmin.clamp(0.0, width),
                ymin.clamp(0.0, height),
                xmax.clamp(0.0, width),
                ymax.clamp(0.0, height),
            ]
        })
        .collect()
}

/// Apply a random rotation, scale, shear and translation to an image and its boxes.
///
/// The output canvas is the input size plus `2 * border` and is filled with
/// [`BORDER_VALUE`] where the warped image does not reach. Boxes are warped
/// through their four corners, clipped to the canvas and dropped when they no
/// longer pass [`box_candidates`].
///
/// # Arguments
///
/// * `rng` - The random number generator.
/// * `image` - The input image with shape (H, W, C).
/// * `targets` - Boxes in corner format with their labels.
/// * `params` - The sampling ranges.
///
/// # Returns
///
/// The warped image and the surviving targets, in their original order.
///
/// # Errors
///
/// Returns [`TransformError::InvalidCanvas`] if the border leaves no pixels, or
/// an image error if the sampled matrix cannot be inverted.
pub fn random_perspective<R: Rng + ?Sized, const C: usize>(
    rng: &mut R,
    image: &Image<u8, C>,
    targets: &[Target],
    params: &RandomPerspectiveParams,
) -> Result<(Image<u8, C>, Vec<Target>), TransformError> {
    let canvas = canvas_size(image.size(), params.border)?;
    let sample = AffineSample::sample(rng, image.size(), canvas, params);

    let warped = warp_with_matrix(image, canvas, &sample.matrix, params.perspective)?;

    if targets.is_empty() {
        return Ok((warped, Vec::new()));
    }

    let after = transform_boxes(targets, &sample.matrix, canvas, params.perspective);
    let before = targets
        .iter()
        .map(|t| t.bbox.map(|v| f64::from(v) * sample.scale))
        .collect::<Vec<_>>();

    let keep = box_candidates(&before, &after, &params.candidates);

    let kept = targets
        .iter()
        .zip(after.iter())
        .zip(keep.iter())
        .filter(|&(_, &k)| k)
        .map(|((t, b), _)| Target {
            bbox: b.map(|v| v as f32),
            label: t.label,
        })
        .collect::<Vec<_>>();

    debug!(
        "random_perspective: kept {} of {} boxes",
        kept.len(),
        targets.len()
    );

    Ok((warped, kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn identity_params() -> RandomPerspectiveParams {
        RandomPerspectiveParams {
            degrees: 0.0,
            translate: 0.0,
            scale: (1.0, 1.0),
            shear: 0.0,
            perspective: false,
            border: (0, 0),
            ..Default::default()
        }
    }

    #[test]
    fn matrix_translation_only() {
        let src = ImageSize {
            width: 10,
            height: 20,
        };
        let canvas = ImageSize {
            width: 30,
            height: 40,
        };
        let m = build_transform_matrix(src, canvas, 0.0, 1.0, (0.0, 0.0), (0.5, 0.5));
        // image center (5, 10) goes to canvas center (15, 20)
        assert_relative_eq!(m[0][2], 10.0);
        assert_relative_eq!(m[1][2], 10.0);
        assert_relative_eq!(m[0][0], 1.0);
        assert_relative_eq!(m[1][1], 1.0);
    }

    #[test]
    fn matrix_rotation_90() {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let m = build_transform_matrix(size, size, 90.0, 1.0, (0.0, 0.0), (0.5, 0.5));
        // R = [[0, 1], [-1, 0]]: the point (4, 2) maps to (2, 0)
        let (x, y) = (4.0, 2.0);
        let u = m[0][0] * x + m[0][1] * y + m[0][2];
        let v = m[1][0] * x + m[1][1] * y + m[1][2];
        assert_relative_eq!(u, 2.0, epsilon = 1e-9);
        assert_relative_eq!(v, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn matrix_shear_uses_tangent() {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let m = build_transform_matrix(size, size, 0.0, 1.0, (45.0, 0.0), (0.5, 0.5));
        assert_relative_eq!(m[0][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(m[1][0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn identity_params_are_identity() -> Result<(), TransformError> {
        let mut rng = StdRng::seed_from_u64(42);
        let size = ImageSize {
            width: 8,
            height: 6,
        };
        let data = (0..8 * 6 * 3).map(|v| v as u8).collect();
        let image = Image::<u8, 3>::new(size, data)?;
        let targets = [
            Target::new(1.0, 1.0, 6.0, 5.0, 3.0),
            Target::new(0.0, 0.0, 8.0, 6.0, 1.0),
        ];

        let (warped, kept) = random_perspective(&mut rng, &image, &targets, &identity_params())?;
        assert_eq!(warped, image);
        assert_eq!(kept, targets.to_vec());
        Ok(())
    }

    #[test]
    fn border_grows_canvas() -> Result<(), TransformError> {
        let mut rng = StdRng::seed_from_u64(0);
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            7,
        )?;
        let params = RandomPerspectiveParams {
            border: (2, 3),
            ..identity_params()
        };
        let targets = [Target::new(0.0, 0.0, 4.0, 4.0, 0.0)];
        let (warped, kept) = random_perspective(&mut rng, &image, &targets, &params)?;

        assert_eq!(
            warped.size(),
            ImageSize {
                width: 10,
                height: 8
            }
        );
        // image is pasted at the canvas center, the rest is border
        assert_eq!(warped.get([0, 0, 0]), Some(&114));
        assert_eq!(warped.get([3, 4, 1]), Some(&7));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox, [3.0, 2.0, 7.0, 6.0]);
        Ok(())
    }

    #[test]
    fn perspective_warp_scales_about_center() -> Result<(), TransformError> {
        let mut rng = StdRng::seed_from_u64(5);
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 16,
                height: 16,
            },
            7,
        )?;
        let params = RandomPerspectiveParams {
            scale: (0.5, 0.5),
            perspective: true,
            ..identity_params()
        };
        let targets = [
            Target::new(0.0, 0.0, 16.0, 16.0, 1.0),
            Target::new(0.0, 0.0, 2.0, 2.0, 2.0),
        ];
        let (warped, kept) = random_perspective(&mut rng, &image, &targets, &params)?;

        // the image shrinks into [4, 12) and the rest is filled with the border
        assert_eq!(warped.size(), image.size());
        assert_eq!(warped.get([0, 0, 0]), Some(&114));
        assert_eq!(warped.get([3, 8, 1]), Some(&114));
        assert_eq!(warped.get([8, 12, 2]), Some(&114));
        assert_eq!(warped.get([4, 4, 0]), Some(&7));
        assert_eq!(warped.get([11, 11, 2]), Some(&7));

        // the 1 px box is dropped
        assert_eq!(kept, vec![Target::new(4.0, 4.0, 12.0, 12.0, 1.0)]);

        let affine = RandomPerspectiveParams {
            perspective: false,
            ..params
        };
        let (warped_affine, kept_affine) =
            random_perspective(&mut StdRng::seed_from_u64(5), &image, &targets, &affine)?;
        assert_eq!(warped_affine, warped);
        assert_eq!(kept_affine, kept);
        Ok(())
    }

    #[test]
    fn negative_border_crops() -> Result<(), TransformError> {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        assert_eq!(
            canvas_size(size, (-2, -1))?,
            ImageSize {
                width: 8,
                height: 6
            }
        );
        assert_eq!(
            canvas_size(size, (-5, 0)),
            Err(TransformError::InvalidCanvas {
                width: 10,
                height: 0
            })
        );
        Ok(())
    }

    #[test]
    fn boxes_are_clipped_and_filtered() {
        let canvas = ImageSize {
            width: 10,
            height: 10,
        };
        let mut m = IDENTITY;
        m[0][2] = 8.0;
        let targets = [
            Target::new(0.0, 0.0, 5.0, 5.0, 0.0),
            Target::new(1.0, 1.0, 1.5, 9.0, 0.0),
        ];
        let boxes = transform_boxes(&targets, &m, canvas, false);
        assert_eq!(boxes[0], [8.0, 0.0, 10.0, 5.0]);
        assert_eq!(boxes[1], [9.0, 1.0, 9.5, 9.0]);

        let before = targets.iter().map(|t| t.bbox.map(f64::from)).collect::<Vec<_>>();
        let keep = box_candidates(&before, &boxes, &BoxCandidateParams::default());
        // first box is 2 px wide after clipping, second is 0.5 px wide
        assert_eq!(keep, vec![false, false]);
    }

    #[test]
    fn perspective_divides_by_w() {
        let canvas = ImageSize {
            width: 100,
            height: 100,
        };
        let mut m = IDENTITY;
        m[2][2] = 2.0;
        let targets = [Target::new(10.0, 20.0, 30.0, 40.0, 0.0)];
        let boxes = transform_boxes(&targets, &m, canvas, true);
        assert_eq!(boxes[0], [5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn random_perspective_is_reproducible() -> Result<(), TransformError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 32,
                height: 24,
            },
            (0..32 * 24 * 3).map(|v| (v % 251) as u8).collect(),
        )?;
        let targets = [Target::new(4.0, 4.0, 28.0, 20.0, 2.0)];
        let params = RandomPerspectiveParams::default();

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let out1 = random_perspective(&mut rng1, &image, &targets, &params)?;
        let out2 = random_perspective(&mut rng2, &image, &targets, &params)?;
        assert_eq!(out1, out2);

        for t in out1.1.iter() {
            assert!(t.bbox[0] >= 0.0 && t.bbox[2] <= 32.0);
            assert!(t.bbox[1] >= 0.0 && t.bbox[3] <= 24.0);
            assert_eq!(t.label, 2.0);
        }
        Ok(())
    }
}
