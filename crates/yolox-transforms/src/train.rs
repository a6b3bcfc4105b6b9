use log::{debug, warn};
use rand::Rng;

use yolox_image::Image;
use yolox_tensor::{Tensor2, Tensor3};

use crate::anchors::{aggregate_candidates, get_in_boxes_info, AnchorGrid};
use crate::boxes::{xyxy2cxcywh, BBox, Target};
use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::hsv::{augment_hsv, HsvGains};
use crate::mirror::mirror;
use crate::preproc::{preproc, DEFAULT_SWAP};

/// Boxes narrower or shorter than this, in input pixels, are dropped.
const MIN_BOX_SIDE: f64 = 1.0;

/// Pack a label and a scaled `[cx, cy, w, h]` box into a label row.
fn label_row(label: f32, b: &[f64; 4]) -> [f32; 5] {
    [label, b[0] as f32, b[1] as f32, b[2] as f32, b[3] as f32]
}

/// One training sample ready for the model and the loss.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainSample {
    /// The letterboxed image with shape (3, H, W).
    pub image: Tensor3<f32>,
    /// Label rows `[label, cx, cy, w, h]` with shape (max_labels, 5), zero padded.
    pub labels: Tensor2<f32>,
    /// Aggregated candidate mask with shape (max_labels, anchors).
    pub is_in_boxes_all: Tensor2<bool>,
    /// Box and center region membership with shape (max_labels, anchors).
    pub is_in_boxes_and_center: Tensor2<bool>,
}

/// The training transform: color jitter, flip, letterbox and anchor pre-assignment.
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use yolox_image::{Image, ImageSize};
/// use yolox_transforms::boxes::Target;
/// use yolox_transforms::train::TrainTransform;
///
/// let transform = TrainTransform::new(50, 0.5, 1.0).unwrap();
/// let mut rng = StdRng::seed_from_u64(0);
///
/// let image = Image::<u8, 3>::from_size_val(ImageSize { width: 320, height: 240 }, 90).unwrap();
/// let targets = [Target::new(20.0, 30.0, 120.0, 200.0, 2.0)];
///
/// let sample = transform.call(&mut rng, image, &targets, (640, 640)).unwrap();
/// assert_eq!(sample.image.shape, [3, 640, 640]);
/// assert_eq!(sample.labels.shape, [50, 5]);
/// assert_eq!(sample.is_in_boxes_all.shape, [50, 8400]);
/// assert_eq!(sample.labels.get([0, 0]), Some(&2.0));
/// ```
#[derive(Clone, Debug)]
pub struct TrainTransform {
    max_labels: usize,
    flip_prob: f64,
    hsv_prob: f64,
    hsv_gains: HsvGains,
    grid: AnchorGrid,
}

impl TrainTransform {
    /// Build the transform from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if the configuration does not validate.
    pub fn from_config(config: &TransformConfig) -> Result<Self, TransformError> {
        config.validate()?;
        Ok(Self {
            max_labels: config.max_labels,
            flip_prob: config.flip_prob,
            hsv_prob: config.hsv_prob,
            hsv_gains: HsvGains::default(),
            grid: AnchorGrid::new(&config.strides, config.input_size)?,
        })
    }

    /// Build the transform with the default strides `[8, 16, 32]` and input size 640x640.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidConfig`] if an argument is out of range.
    pub fn new(max_labels: usize, flip_prob: f64, hsv_prob: f64) -> Result<Self, TransformError> {
        Self::from_config(&TransformConfig {
            max_labels,
            flip_prob,
            hsv_prob,
            ..Default::default()
        })
    }

    /// Replace the HSV jitter gains.
    pub fn with_hsv_gains(mut self, gains: HsvGains) -> Self {
        self.hsv_gains = gains;
        self
    }

    /// Capacity of the padded label tensor.
    pub fn max_labels(&self) -> usize {
        self.max_labels
    }

    /// The anchor grid the masks are computed on.
    pub fn grid(&self) -> &AnchorGrid {
        &self.grid
    }

    /// Turn one image and its boxes into a training sample.
    ///
    /// The boxes are jittered together with the image and rescaled to the
    /// letterboxed input. When the augmented boxes all collapse below one
    /// pixel, the sample falls back to the un-augmented image and boxes so
    /// that no image loses its ground truth.
    ///
    /// # Arguments
    ///
    /// * `rng` - The random number generator.
    /// * `image` - The 8-bit BGR image.
    /// * `targets` - Boxes in corner format with labels.
    /// * `input_dim` - The `(height, width)` to letterbox to.
    pub fn call<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        image: Image<u8, 3>,
        targets: &[Target],
        input_dim: (usize, usize),
    ) -> Result<TrainSample, TransformError> {
        if targets.is_empty() {
            let (image, _) = preproc(&image, input_dim, DEFAULT_SWAP)?;
            return Ok(TrainSample {
                image,
                labels: Tensor2::zeros([self.max_labels, 5]),
                is_in_boxes_all: Tensor2::zeros([self.max_labels, self.grid.len()]),
                is_in_boxes_and_center: Tensor2::zeros([self.max_labels, self.grid.len()]),
            });
        }

        // box arithmetic runs in f64, rows are rounded to f32 once when packed
        let image_o = image.clone();
        let mut boxes_o = targets
            .iter()
            .map(|t| t.bbox.map(f64::from))
            .collect::<Vec<[f64; 4]>>();
        xyxy2cxcywh(&mut boxes_o);

        let mut image = image;
        if rng.random::<f64>() < self.hsv_prob {
            image = augment_hsv(rng, image, &self.hsv_gains)?;
        }

        let mut boxes = targets
            .iter()
            .map(|t| t.bbox.map(f64::from))
            .collect::<Vec<[f64; 4]>>();
        let image = mirror(rng, image, &mut boxes, self.flip_prob)?;
        let (mut image_t, r) = preproc(&image, input_dim, DEFAULT_SWAP)?;

        xyxy2cxcywh(&mut boxes);
        let mut rows = boxes
            .iter()
            .zip(targets.iter())
            .map(|(b, t)| (t.label, b.map(|v| v * r)))
            .filter(|(_, b)| b[2].min(b[3]) > MIN_BOX_SIDE)
            .map(|(label, b)| label_row(label, &b))
            .collect::<Vec<[f32; 5]>>();

        if rows.is_empty() {
            debug!(
                "TrainTransform: all {} boxes collapsed after augmentation, using the original sample",
                targets.len()
            );
            let (image_fallback, r_o) = preproc(&image_o, input_dim, DEFAULT_SWAP)?;
            image_t = image_fallback;
            rows = boxes_o
                .iter()
                .zip(targets.iter())
                .map(|(b, t)| label_row(t.label, &b.map(|v| v * r_o)))
                .collect();
        }

        let true_labels = rows.len();
        if true_labels > self.max_labels {
            warn!(
                "TrainTransform: {} objects exceed max_labels={}, truncating",
                true_labels, self.max_labels
            );
        }

        let mut labels = Tensor2::<f32>::zeros([self.max_labels, 5]);
        labels
            .as_slice_mut()
            .chunks_exact_mut(5)
            .zip(rows.iter())
            .for_each(|(dst, row)| dst.copy_from_slice(row));

        let gt_boxes = labels
            .as_slice()
            .chunks_exact(5)
            .map(|row| [row[1], row[2], row[3], row[4]])
            .collect::<Vec<BBox>>();

        let info = get_in_boxes_info(&self.grid, &gt_boxes, true_labels);

        Ok(TrainSample {
            image: image_t,
            labels,
            is_in_boxes_all: aggregate_candidates(&info.is_in_boxes_all),
            is_in_boxes_and_center: info.is_in_boxes_and_center,
        })
    }
}
