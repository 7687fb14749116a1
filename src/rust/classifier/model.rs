use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A pretrained image classifier treated as a black box.
///
/// Implementations receive a `[1, height, width, channels]` tensor and return
/// the probability distribution for the single batch element. They must be
/// safe to call concurrently from several request handlers.
pub trait ImageModel: Send + Sync + Debug {
    fn probabilities(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// [`ImageModel`] backed by an ONNX Runtime session.
///
/// The session is created once and only ever borrowed immutably afterwards.
#[derive(Debug)]
pub struct OnnxModel {
    session: Session,
    input_name: String,
}

impl OnnxModel {
    /// Loads the model at `path` and validates its input/output structure.
    ///
    /// # Errors
    /// - `BuildError` if the file does not exist
    /// - `ModelError` if ONNX Runtime rejects the file or the model has no inputs or outputs
    pub fn from_file(path: impl AsRef<Path>, config: &RuntimeConfig) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", path.display())));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)?;
        Self::validate_model(&session)?;

        let input_name = session.inputs[0].name.clone();
        log::info!("Loaded model from {} (input tensor '{}')", path.display(), input_name);

        Ok(Self { session, input_name })
    }

    /// Checks that the model exposes at least one input and one output tensor.
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.is_empty() {
            return Err(ClassifierError::ModelError("Model must have at least 1 input for the image tensor".into()));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError("Model must have at least 1 output for class probabilities".into()));
        }
        Ok(())
    }
}

impl ImageModel for OnnxModel {
    fn probabilities(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_dyn = input.view().into_dyn();
        let input_view = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), Tensor::from_array(&input_view)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        // Either [batch, classes] or a bare [classes] vector.
        let row: Vec<f32> = match output_tensor.ndim() {
            1 => output_tensor.iter().copied().collect(),
            2 => output_tensor.slice(ndarray::s![0, ..]).iter().copied().collect(),
            n => {
                return Err(ClassifierError::PredictionError(format!(
                    "Unexpected output rank {} (shape {:?})",
                    n,
                    output_tensor.shape()
                )))
            }
        };
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let result = OnnxModel::from_file("/nonexistent/skinsight/model.onnx", &RuntimeConfig::default());
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_invalid_model_file() {
        let dir = std::env::temp_dir().join("skinsight-test-invalid-model");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.onnx");
        std::fs::write(&path, "not a protobuf").unwrap();

        let result = OnnxModel::from_file(&path, &RuntimeConfig::default());
        assert!(matches!(result, Err(ClassifierError::ModelError(_))));
    }
}
