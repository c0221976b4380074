//! Inference module
//!
//! Provides binary image classification with:
//! - A `Classifier` seam so any model runtime can back the engine
//! - An ONNX classifier loaded once and shared read-only
//! - Model warmup before the first request
//! - Configurable decision threshold (default 0.5)

mod config;
mod engine;
mod onnx;

pub use config::{InferenceConfig, DEFAULT_THRESHOLD};
pub use engine::InferenceEngine;
pub use onnx::OnnxClassifier;

use crate::error::Result;
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// A pre-trained binary classifier.
///
/// Implementations must be safe to call concurrently from several threads and
/// return one scalar per batch item.
pub trait Classifier: Send + Sync {
    /// Score every item of `batch`
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>>;

    /// Short identifier for logs
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Outcome of classifying one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// `true` when the score is below the decision threshold
    pub is_authentic: bool,
    /// Raw classifier output
    pub score: f32,
}

impl InferenceResult {
    /// Wire representation of the verdict
    pub fn label(&self) -> &'static str {
        if self.is_authentic {
            "True"
        } else {
            "False"
        }
    }
}
