//! Image preprocessing module
//!
//! Prepares uploaded images for the classifier:
//! - Content-sniffed decoding (PNG, JPEG, GIF, WebP, BMP)
//! - RGB conversion and exact resize to the model resolution
//! - Channel scaling from `[0, 255]` to `[0, 1]`
//! - Batch tensor construction in NHWC or NCHW layout

mod config;
mod pipeline;

pub use config::{PreprocessingConfig, ResizeFilter, TensorLayout, DEFAULT_IMAGE_SIZE};
pub use pipeline::ImagePreprocessor;
