//! ONNX-backed classifier

use crate::error::{DetectorError, Result};
use super::Classifier;
use ndarray::Array4;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

pub type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Binary image classifier loaded from an ONNX artifact.
///
/// The graph is optimized for a fixed input shape once at load time and then
/// shared read-only across requests.
pub struct OnnxClassifier {
    plan: Model,
    input_shape: [usize; 4],
    path: PathBuf,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("path", &self.path)
            .field("input_shape", &self.input_shape)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load the model at `path` with a fixed `input_shape`
    pub fn load<P: AsRef<Path>>(path: P, input_shape: [usize; 4]) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DetectorError::ModelLoad(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(input_shape).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| DetectorError::ModelLoad(format!("{}: {:#}", path.display(), e)))?;

        Ok(Self {
            plan,
            input_shape,
            path: path.to_path_buf(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>> {
        if batch.shape() != &self.input_shape[..] {
            return Err(DetectorError::InvalidInput(format!(
                "Expected batch shape {:?}, got {:?}",
                self.input_shape,
                batch.shape()
            )));
        }

        let contiguous = batch.as_standard_layout();
        let data = contiguous
            .as_slice()
            .ok_or_else(|| DetectorError::InvalidInput("Batch is not contiguous".to_string()))?;
        let tensor = Tensor::from_shape(batch.shape(), data)
            .map_err(|e| DetectorError::InvalidInput(format!("{:#}", e)))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| DetectorError::Inference(format!("{:#}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| DetectorError::Inference("Model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| DetectorError::Inference(format!("{:#}", e)))?;

        first_per_row(view.iter().copied().collect(), batch.shape()[0])
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Take the first scalar of each batch row from a flattened output
fn first_per_row(flat: Vec<f32>, n_rows: usize) -> Result<Vec<f32>> {
    if n_rows == 0 || flat.len() < n_rows {
        return Err(DetectorError::Inference(format!(
            "Model produced {} values for a batch of {}",
            flat.len(),
            n_rows
        )));
    }
    let per_row = flat.len() / n_rows;
    Ok(flat.into_iter().step_by(per_row).take(n_rows).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferenceConfig, InferenceEngine};
    use crate::preprocessing::{ImagePreprocessor, PreprocessingConfig, TensorLayout};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use prost::Message;
    use tract_onnx::pb::{
        type_proto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TypeProto,
        ValueInfoProto,
    };

    fn float_value(name: &str) -> ValueInfoProto {
        ValueInfoProto {
            name: name.to_string(),
            r#type: Some(TypeProto {
                value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                    elem_type: 1, // FLOAT
                    shape: None,
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Write a one-node model whose output is the mean of every input value
    fn write_mean_model(dir: &Path) -> PathBuf {
        let model = ModelProto {
            ir_version: 7,
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            graph: Some(GraphProto {
                name: "mean".to_string(),
                node: vec![NodeProto {
                    op_type: "ReduceMean".to_string(),
                    input: vec!["input".to_string()],
                    output: vec!["score".to_string()],
                    ..Default::default()
                }],
                input: vec![float_value("input")],
                output: vec![float_value("score")],
                ..Default::default()
            }),
            ..Default::default()
        };

        let path = dir.join("mean.onnx");
        std::fs::write(&path, model.encode_to_vec()).unwrap();
        path
    }

    fn solid_png(value: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([value; 3])))
            .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn mean_engine(model: &Path, layout: TensorLayout) -> InferenceEngine {
        let preprocessor =
            ImagePreprocessor::with_config(PreprocessingConfig::new().with_layout(layout));
        InferenceEngine::load(InferenceConfig::new(), preprocessor, model).unwrap()
    }

    #[test]
    fn test_predict_runs_model() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = OnnxClassifier::load(write_mean_model(dir.path()), [1, 128, 128, 3]).unwrap();

        let scores = classifier.predict(&Array4::from_elem((1, 128, 128, 3), 0.25)).unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_predict_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = OnnxClassifier::load(write_mean_model(dir.path()), [1, 128, 128, 3]).unwrap();

        let err = classifier.predict(&Array4::zeros((1, 3, 128, 128))).unwrap_err();
        assert!(matches!(err, DetectorError::InvalidInput(_)));
    }

    #[test]
    fn test_threshold_boundary_through_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_mean_model(dir.path());

        for layout in [TensorLayout::Nhwc, TensorLayout::Nchw] {
            let engine = mean_engine(&model, layout);

            let dark = engine.predict_bytes(&solid_png(127)).unwrap();
            assert!(dark.is_authentic, "{:?}: score {}", layout, dark.score);
            assert_eq!(dark.label(), "True");

            let light = engine.predict_bytes(&solid_png(128)).unwrap();
            assert!(!light.is_authentic, "{:?}: score {}", layout, light.score);
            assert_eq!(light.label(), "False");
        }
    }

    #[test]
    fn test_missing_model_file() {
        let err = OnnxClassifier::load("/nonexistent/model.onnx", [1, 128, 128, 3]).unwrap_err();
        assert!(matches!(err, DetectorError::ModelLoad(_)));
        assert!(err.to_string().contains("/nonexistent/model.onnx"));
    }

    #[test]
    fn test_invalid_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.onnx");
        std::fs::write(&path, b"not a protobuf graph").unwrap();

        let err = OnnxClassifier::load(&path, [1, 128, 128, 3]).unwrap_err();
        assert!(matches!(err, DetectorError::ModelLoad(_)));
    }

    #[test]
    fn test_first_per_row_single_scalar() {
        assert_eq!(first_per_row(vec![0.25], 1).unwrap(), vec![0.25]);
    }

    #[test]
    fn test_first_per_row_multi_output() {
        // [2, 2] output: take column 0 of each row
        assert_eq!(first_per_row(vec![0.1, 0.9, 0.7, 0.3], 2).unwrap(), vec![0.1, 0.7]);
    }

    #[test]
    fn test_first_per_row_empty_output() {
        assert!(matches!(first_per_row(vec![], 1), Err(DetectorError::Inference(_))));
    }
}
