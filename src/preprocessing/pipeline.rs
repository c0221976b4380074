//! Image preprocessing pipeline
//!
//! Decode → RGB → resize to the model resolution → `[0, 1]` scaled batch tensor.

use crate::error::{DetectorError, Result};
use super::config::{PreprocessingConfig, TensorLayout};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Turns raw image files into single-item classifier batches
#[derive(Debug, Clone, Default)]
pub struct ImagePreprocessor {
    config: PreprocessingConfig,
}

impl ImagePreprocessor {
    /// Create a preprocessor with the default 128×128 NHWC configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preprocessor with a custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Read and decode the file at `path`, returning a batch of one.
    ///
    /// The format is sniffed from the content, so the file name and extension
    /// play no part in decoding.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Array4<f32>> {
        let bytes = std::fs::read(path.as_ref())?;
        self.from_bytes(&bytes)
    }

    /// Decode an in-memory image, returning a batch of one
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Array4<f32>> {
        let start = Instant::now();
        let img = image::load_from_memory(bytes)?;
        let (orig_w, orig_h) = (img.width(), img.height());
        let batch = self.transform(&img)?;
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image preprocessed"
        );
        Ok(batch)
    }

    /// Resize and normalize an already decoded image
    pub fn transform(&self, img: &DynamicImage) -> Result<Array4<f32>> {
        let (w, h) = (self.config.target_width, self.config.target_height);
        if w == 0 || h == 0 {
            return Err(DetectorError::InvalidInput(format!(
                "Target size must be non-zero, got {}x{}",
                w, h
            )));
        }

        // Exact resize: aspect ratio is not preserved
        let rgb: RgbImage = img
            .resize_exact(w, h, self.config.filter.as_filter_type())
            .to_rgb8();

        let (h, w) = (h as usize, w as usize);
        let pixel = |x: usize, y: usize, c: usize| rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;

        let tensor = match self.config.layout {
            TensorLayout::Nhwc => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| pixel(x, y, c)),
            TensorLayout::Nchw => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| pixel(x, y, c)),
        };

        Ok(tensor)
    }
}
