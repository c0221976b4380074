//! Inference engine implementation
//!
//! Couples the image preprocessor, a shared classifier and the decision
//! threshold into a single file → verdict call.

use crate::error::{DetectorError, Result};
use crate::preprocessing::ImagePreprocessor;
use super::{Classifier, InferenceConfig, InferenceResult, OnnxClassifier};
use ndarray::Array4;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Read-only inference engine shared by every request
pub struct InferenceEngine {
    config: InferenceConfig,
    preprocessor: ImagePreprocessor,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("config", &self.config)
            .field("preprocessor", &self.preprocessor)
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

impl InferenceEngine {
    /// Create an engine around an already constructed classifier
    pub fn new(
        config: InferenceConfig,
        preprocessor: ImagePreprocessor,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            config,
            preprocessor,
            classifier,
        }
    }

    /// Load an ONNX model sized for the preprocessor's output, warming it up
    /// if configured
    pub fn load<P: AsRef<Path>>(
        config: InferenceConfig,
        preprocessor: ImagePreprocessor,
        model_path: P,
    ) -> Result<Self> {
        let start = Instant::now();
        let input_shape = preprocessor.config().batch_shape();
        let classifier = OnnxClassifier::load(model_path.as_ref(), input_shape)?;
        info!(
            model = %model_path.as_ref().display(),
            input_shape = ?input_shape,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model loaded"
        );

        let engine = Self::new(config, preprocessor, Arc::new(classifier));
        if engine.config.warmup {
            engine.warmup()?;
        }
        Ok(engine)
    }

    /// Warm up the engine by running an all-zero batch through the classifier
    pub fn warmup(&self) -> Result<()> {
        let start = Instant::now();
        let shape = self.preprocessor.config().batch_shape();
        let dummy = Array4::<f32>::zeros((shape[0], shape[1], shape[2], shape[3]));
        let score = self.score(&dummy)?;
        debug!(
            score,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Warmup complete"
        );
        Ok(())
    }

    /// Raw classifier outputs for a batch, one scalar per item
    pub fn predict_batch(&self, batch: &Array4<f32>) -> Result<Vec<f32>> {
        self.classifier.predict(batch)
    }

    /// Scalar score for a single-item batch
    pub fn score(&self, batch: &Array4<f32>) -> Result<f32> {
        let scores = self.predict_batch(batch)?;
        let score = scores
            .first()
            .copied()
            .ok_or_else(|| DetectorError::Inference("Classifier returned no scores".to_string()))?;
        if !score.is_finite() {
            return Err(DetectorError::Inference(format!(
                "Classifier returned a non-finite score: {}",
                score
            )));
        }
        Ok(score)
    }

    /// Apply the decision threshold to a score
    pub fn decide(&self, score: f32) -> InferenceResult {
        InferenceResult {
            is_authentic: score < self.config.classification_threshold,
            score,
        }
    }

    /// Classify a decoded batch
    pub fn predict_tensor(&self, batch: &Array4<f32>) -> Result<InferenceResult> {
        Ok(self.decide(self.score(batch)?))
    }

    /// Decode, preprocess and classify the image file at `path`
    pub fn predict_file<P: AsRef<Path>>(&self, path: P) -> Result<InferenceResult> {
        let batch = self.preprocessor.load(path)?;
        self.predict_tensor(&batch)
    }

    /// Decode, preprocess and classify an in-memory image
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<InferenceResult> {
        let batch = self.preprocessor.from_bytes(bytes)?;
        self.predict_tensor(&batch)
    }
}
