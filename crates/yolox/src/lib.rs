//! Data augmentation and label assignment for training YOLOX object detectors.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use yolox::image::{Image, ImageSize};
//! use yolox::transforms::{Target, TrainTransform, ValTransform};
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let image = Image::<u8, 3>::from_size_val(ImageSize { width: 320, height: 320 }, 114).unwrap();
//! let targets = [Target::new(16.0, 16.0, 160.0, 200.0, 0.0)];
//!
//! let train = TrainTransform::new(50, 0.5, 1.0).unwrap();
//! let sample = train.call(&mut rng, image.clone(), &targets, (640, 640)).unwrap();
//! assert_eq!(sample.labels.shape, [50, 5]);
//!
//! let (chw, _) = ValTransform::default().call(&image, (640, 640)).unwrap();
//! assert_eq!(chw.shape, [3, 640, 640]);
//! ```

#[doc(inline)]
pub use yolox_tensor as tensor;

#[doc(inline)]
pub use yolox_image as image;

#[doc(inline)]
pub use yolox_imgproc as imgproc;

#[doc(inline)]
pub use yolox_transforms as transforms;
