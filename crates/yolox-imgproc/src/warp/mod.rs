//! Geometric image transformations using affine and perspective warps.
//!
//! Both warps take the forward matrix (source to destination), invert it and
//! sample the source for every destination pixel. Destination pixels whose
//! preimage lies outside the source are set to the constant `border` value.
//!
//! # Examples
//!
//! ```
//! use yolox_image::{Image, ImageSize};
//! use yolox_imgproc::interpolation::InterpolationMode;
//! use yolox_imgproc::warp::{get_rotation_matrix2d, warp_affine};
//!
//! let src = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 8 }, 10).unwrap();
//! let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0).unwrap();
//!
//! let m = get_rotation_matrix2d((4.0, 4.0), 45.0, 1.0);
//! warp_affine(&src, &mut dst, &m, InterpolationMode::Bilinear, &[114.0; 3]).unwrap();
//! ```

mod affine;
mod perspective;

pub use affine::{get_rotation_matrix2d, invert_affine_transform, warp_affine};
pub use perspective::warp_perspective;
