//! Skin lesion classification over HTTP, backed by a pretrained ONNX model.
//!
//! An uploaded photo is decoded, resized to 224x224, scaled into `[0, 1]` and
//! passed to the model. The most probable class is returned together with a
//! static description and handling advice.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use skinsight::{labels, Classifier};
//!
//! let classifier = Classifier::builder()
//!     .with_model_path("model/model.onnx")
//!     .build()?;
//!
//! let result = classifier.predict(&std::fs::read("lesion.jpg")?)?;
//! let info = labels::lookup(result.label.as_str());
//! println!("{}: {}", result.label, info.handling);
//! # Ok(())
//! # }
//! ```
//!
//! # Serving
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use skinsight::{server, Classifier};
//!
//! let classifier = Classifier::builder()
//!     .with_model_path("model/model.onnx")
//!     .build()?;
//! let app = server::router(server::AppState::new(classifier));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod labels;
pub mod model_manager;
mod runtime;
pub mod server;

pub use classifier::{Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, ImageModel, OnnxModel, PredictionResult};
pub use labels::{ClassLabel, DiseaseInfo};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError, ModelSource};

/// Initializes `env_logger`, defaulting to the `info` level when `RUST_LOG` is unset.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
