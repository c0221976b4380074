//! Inference configuration

use serde::{Deserialize, Serialize};

/// Scores strictly below this value are reported as `"True"`
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Configuration for model inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Decision threshold applied to the classifier's scalar output
    pub classification_threshold: f32,

    /// Run a dummy batch through the model right after loading
    pub warmup: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            classification_threshold: DEFAULT_THRESHOLD,
            warmup: true,
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set classification threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.classification_threshold = threshold;
        self
    }

    /// Builder method to enable or disable warmup
    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }
}
