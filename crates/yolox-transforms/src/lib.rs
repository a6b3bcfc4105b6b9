#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! The crate turns a raw image and its boxes into what a YOLOX training step
//! consumes:
//!
//! * geometric and color augmentation ([`perspective`], [`hsv`], [`mirror`]),
//! * the letterbox resize to the network input ([`preproc`]),
//! * the geometric pre-assignment of ground truth to anchor points ([`anchors`]),
//! * the per-sample orchestrators [`train::TrainTransform`] and [`val::ValTransform`].
//!
//! Every random operation takes the generator explicitly, so a seeded
//! `StdRng` reproduces a sample exactly.

/// box formats and candidate filtering.
pub mod boxes;

/// anchor grids and ground truth membership masks.
pub mod anchors;

/// configuration of the training transform.
pub mod config;

/// Error types for the transforms module.
pub mod error;

/// color jitter in HSV space.
pub mod hsv;

/// horizontal flip of images and boxes.
pub mod mirror;

/// image standardization.
pub mod normalize;

/// random affine and perspective warps of images and boxes.
pub mod perspective;

/// letterbox resize and padding.
pub mod preproc;

/// the training transform.
pub mod train;

/// the evaluation transform.
pub mod val;

pub use crate::boxes::{BBox, Target};
pub use crate::config::TransformConfig;
pub use crate::error::TransformError;
pub use crate::train::{TrainSample, TrainTransform};
pub use crate::val::ValTransform;

use rand::Rng;

/// Uniform sample in `[low, high]`, also defined for `low >= high`.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.random::<f64>()
}
