use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::model::{ImageModel, OnnxModel};
use crate::runtime::RuntimeConfig;

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    model_path: Option<PathBuf>,
    model: Option<Arc<dyn ImageModel>>,
    runtime_config: RuntimeConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use skinsight::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution
    ///
    /// Only applies to models loaded through [`with_model_path`](Self::with_model_path).
    ///
    /// # Example
    /// ```
    /// use skinsight::{ClassifierBuilder, RuntimeConfig};
    ///
    /// let config = RuntimeConfig::default();
    /// let builder = ClassifierBuilder::new()
    ///     .with_runtime_config(config);
    /// ```
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Sets the path of the ONNX model file to load on [`build`](Self::build).
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Uses an already constructed model instead of loading one from disk.
    pub fn with_model(mut self, model: impl ImageModel + 'static) -> Self {
        self.model = Some(Arc::new(model));
        self
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - Neither a model path nor a model was provided
    ///   - Both a model path and a model were provided
    ///   - The model path is empty or the file failed to load
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        match (self.model_path, self.model) {
            (Some(_), Some(_)) => Err(ClassifierError::BuildError(
                "Provide either a model path or a model, not both".to_string(),
            )),
            (None, None) => Err(ClassifierError::BuildError("A model must be set".to_string())),
            (None, Some(model)) => Ok(Classifier { model_path: None, model }),
            (Some(path), None) => {
                if path.as_os_str().is_empty() {
                    return Err(ClassifierError::BuildError("Model path cannot be empty".to_string()));
                }
                let model = OnnxModel::from_file(&path, &self.runtime_config).map_err(|e| {
                    error!("Failed to load model {}: {}", path.display(), e);
                    e
                })?;
                info!("Classifier ready with model {}", path.display());
                Ok(Classifier {
                    model_path: Some(path.to_string_lossy().to_string()),
                    model: Arc::new(model),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[derive(Debug)]
    struct Uniform;

    impl ImageModel for Uniform {
        fn probabilities(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            Ok(vec![1.0 / 9.0; 9])
        }
    }

    #[test]
    fn test_build_without_model() {
        let result = ClassifierBuilder::new().build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_build_with_both_sources() {
        let result = ClassifierBuilder::new()
            .with_model_path("model.onnx")
            .with_model(Uniform)
            .build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_empty_model_path() {
        let result = ClassifierBuilder::new().with_model_path("").build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_missing_model_file() {
        let result = ClassifierBuilder::new()
            .with_model_path("/nonexistent/model.onnx")
            .build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }
}
