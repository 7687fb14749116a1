mod builder;
mod classifier;
mod error;
mod model;
mod preprocess;

pub use builder::ClassifierBuilder;
pub use classifier::{select, Classifier, PredictionResult};
pub use error::ClassifierError;
pub use model::{ImageModel, OnnxModel};
pub use preprocess::{preprocess, INPUT_CHANNELS, INPUT_SIZE};

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file, if the model was loaded from disk
    pub model_path: Option<String>,
    /// Number of classes the model predicts
    pub num_classes: usize,
    /// Labels of the classes, in model output order
    pub class_labels: Vec<String>,
}
