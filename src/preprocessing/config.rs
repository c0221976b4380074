//! Preprocessing configuration

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Canonical input resolution the classifier was trained on
pub const DEFAULT_IMAGE_SIZE: u32 = 128;

/// Sampling filter used when resizing to the model resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour (matches the training-time loader)
    Nearest,
    /// Linear interpolation
    Triangle,
    /// Cubic interpolation
    CatmullRom,
    /// Lanczos with window 3
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn as_filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Memory layout of the batch tensor handed to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, the Keras default
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

impl std::str::FromStr for TensorLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nhwc" => Ok(TensorLayout::Nhwc),
            "nchw" => Ok(TensorLayout::Nchw),
            other => Err(format!("unknown tensor layout '{}', expected nhwc or nchw", other)),
        }
    }
}

/// Configuration for image preprocessing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Width the decoded image is resized to
    pub target_width: u32,

    /// Height the decoded image is resized to
    pub target_height: u32,

    /// Resize sampling filter
    pub filter: ResizeFilter,

    /// Output tensor layout
    pub layout: TensorLayout,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_IMAGE_SIZE,
            target_height: DEFAULT_IMAGE_SIZE,
            filter: ResizeFilter::Nearest,
            layout: TensorLayout::Nhwc,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new preprocessing configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the target resolution
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    /// Builder method to set the resize filter
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builder method to set the tensor layout
    pub fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Shape of a single-image batch in the configured layout
    pub fn batch_shape(&self) -> [usize; 4] {
        let (h, w) = (self.target_height as usize, self.target_width as usize);
        match self.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.target_width, 128);
        assert_eq!(config.target_height, 128);
        assert_eq!(config.filter, ResizeFilter::Nearest);
        assert_eq!(config.batch_shape(), [1, 128, 128, 3]);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_size(64, 32)
            .with_layout(TensorLayout::Nchw)
            .with_filter(ResizeFilter::Triangle);

        assert_eq!(config.batch_shape(), [1, 3, 32, 64]);
        assert_eq!(config.filter, ResizeFilter::Triangle);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("NCHW".parse::<TensorLayout>(), Ok(TensorLayout::Nchw));
        assert_eq!("nhwc".parse::<TensorLayout>(), Ok(TensorLayout::Nhwc));
        assert!("hwc".parse::<TensorLayout>().is_err());
    }
}
