//! Pixel interpolation methods for image transformations.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: uses the nearest pixel value (no interpolation)
//! - **Bilinear**: linear interpolation between the four adjacent pixels
//!
//! Samples that fall (partially) outside the source image take the supplied
//! constant border value for the missing taps, which is what OpenCV does
//! for `BORDER_CONSTANT`.

mod bilinear;

/// Grid generation and coordinate mapping utilities.
pub mod grid;

pub(crate) mod interpolate;
mod nearest;

pub use interpolate::{interpolate_pixel, InterpolationMode};
