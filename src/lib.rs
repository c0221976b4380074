//! Deepfake detector - image authenticity inference service
//!
//! Accepts an uploaded image, runs it through a pre-trained binary classifier
//! and answers with a thresholded verdict.
//!
//! # Modules
//!
//! - [`preprocessing`] - Decode, resize and normalize images into batch tensors
//! - [`inference`] - Classifier seam, ONNX classifier, threshold decision
//! - [`staging`] - Per-request transient upload files with scoped cleanup
//! - [`server`] - HTTP server exposing `POST /predict`
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Pipeline
pub mod preprocessing;
pub mod inference;
pub mod staging;

// Services
pub mod server;
pub mod cli;

pub use error::{DetectorError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{DetectorError, Result};
    pub use crate::inference::{Classifier, InferenceConfig, InferenceEngine, InferenceResult, OnnxClassifier};
    pub use crate::preprocessing::{ImagePreprocessor, PreprocessingConfig, ResizeFilter, TensorLayout};
    pub use crate::server::{create_router, run_server, AppState, ServerConfig};
    pub use crate::staging::{StagedFile, StagingArea};
}
