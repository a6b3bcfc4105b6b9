mod hsv;
mod lut;

pub use hsv::{bgr_from_hsv_u8, hsv_from_bgr_u8};
pub use lut::apply_lut;
