//! Error types for the deepfake detector

use thiserror::Error;

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Main error type for staging, preprocessing and inference
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<image::ImageError> for DetectorError {
    fn from(err: image::ImageError) -> Self {
        DetectorError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts_to_storage() {
        let err: DetectorError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DetectorError::Storage(_)));
    }

    #[test]
    fn test_display_includes_category() {
        let err = DetectorError::Decode("bad header".to_string());
        assert_eq!(err.to_string(), "Decode error: bad header");
    }
}
