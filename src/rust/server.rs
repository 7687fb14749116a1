//! HTTP surface: `POST /predict` and `GET /health`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::classifier::{Classifier, ClassifierError, PredictionResult};

/// Multipart field that carries the uploaded image.
pub const IMAGE_FIELD: &str = "gambar";

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

impl AppState {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

/// Body of a successful prediction. Field order is part of the contract.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub penyakit: &'static str,
    pub deskripsi: &'static str,
    pub penanganan: &'static str,
    pub probabilitas: f32,
    pub status: &'static str,
}

impl From<&PredictionResult> for PredictionResponse {
    fn from(result: &PredictionResult) -> Self {
        let info = result.info();
        Self {
            penyakit: result.label.as_str(),
            deskripsi: info.description,
            penanganan: info.handling,
            probabilitas: result.probability,
            status: "success",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing form field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid multipart request: {0}")]
    Multipart(String),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("Inference task failed: {0}")]
    Task(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Classifier(ClassifierError::ImageError(_))
            | ApiError::Classifier(ClassifierError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::Classifier(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Prediction failed: {}", self);
        } else {
            log::warn!("Rejected request: {}", self);
        }
        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        // Uploads are not size-limited.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Multipart(e.body_text()))?;
    let image = read_image_field(&mut multipart).await?;

    let started = Instant::now();
    let classifier = Arc::clone(&state.classifier);
    let result = tokio::task::spawn_blocking(move || classifier.predict(&image))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;

    log::info!(
        "Predicted '{}' with probability {:.4} in {:.2?}",
        result.label,
        result.probability,
        started.elapsed()
    );
    log::debug!("Full distribution: {:?}", result.probabilities);

    Ok(Json(PredictionResponse::from(&result)))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.body_text()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Multipart(e.body_text()))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(ApiError::MissingField(IMAGE_FIELD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ClassLabel;

    #[test]
    fn test_response_field_order() {
        let result = PredictionResult {
            label: ClassLabel::Dermatofibroma,
            probability: 0.5,
            probabilities: vec![0.0; 9],
        };
        let json = serde_json::to_string(&PredictionResponse::from(&result)).unwrap();
        let keys = ["\"penyakit\"", "\"deskripsi\"", "\"penanganan\"", "\"probabilitas\"", "\"status\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", json);
        assert!(json.contains("\"status\":\"success\""));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::MissingField(IMAGE_FIELD).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ClassifierError::ImageError("bad".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ClassifierError::ModelError("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ClassifierError::PredictionError("nan".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
