//! Routes and handlers.
//!
//! | Route                  | Success | Errors        |
//! |------------------------|---------|---------------|
//! | `GET /`                | 200     |               |
//! | `GET /health`          | 200     | 503 unhealthy |
//! | `POST /predict`        | 200     | 400, 503, 500 |
//! | `POST /batch-predict`  | 200     | 400, 503      |
//!
//! Request bodies are read as raw bytes and parsed here, so that malformed
//! JSON gets the same error envelope as every other client error.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::debug;

use super::middleware::log_request;
use crate::MoodringError;
use crate::service::SentimentService;
use crate::types::{
    BatchPrediction, BatchPredictionRequest, HealthStatus, Prediction, PredictionRequest,
};
use crate::version::PKG_VERSION;

/// Human-readable service description for `GET /`.
const SERVICE_DESCRIPTION: &str = "Dockerized Sentiment Analysis API With Caching and Health Checks";

type SharedService = Arc<SentimentService>;

/// Build the application router over a shared service.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/batch-predict", post(batch_predict))
        .layer(axum::middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn index(State(service): State<SharedService>) -> Json<Value> {
    Json(json!({
        "service": SERVICE_DESCRIPTION,
        "version": PKG_VERSION,
        "endpoints": {
            "health": "/health",
            "predict": "/predict (POST)",
            "batch_predict": "/batch-predict (POST)",
        },
        "model": service.gateway().model(),
    }))
}

async fn health(State(service): State<SharedService>) -> (StatusCode, Json<HealthStatus>) {
    let report = service.health().await;
    let code = if report.status.is_serving() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

async fn predict(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Json<Prediction>, ApiError> {
    service.ensure_available()?;
    let request = PredictionRequest::from_json(&parse_body(&body)?)?;
    Ok(Json(service.predict(&request).await?))
}

async fn batch_predict(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Json<BatchPrediction>, ApiError> {
    service.ensure_available()?;
    let request = BatchPredictionRequest::from_json(&parse_body(&body)?)?;
    Ok(Json(service.predict_batch(&request).await?))
}

fn parse_body(body: &[u8]) -> Result<Value, MoodringError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "unparseable request body");
        MoodringError::InvalidInput("request body must be valid JSON".to_string())
    })
}

/// JSON error envelope: `{"error": ..., "message": ...}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Maps [`MoodringError`] onto an HTTP status and error envelope.
#[derive(Debug)]
pub struct ApiError(pub MoodringError);

impl From<MoodringError> for ApiError {
    fn from(err: MoodringError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            MoodringError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MoodringError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            MoodringError::InvalidInput(message) => ErrorBody {
                error: "Bad request",
                message,
            },
            MoodringError::ModelUnavailable => ErrorBody {
                error: "Model not available",
                message: "Sentiment analysis model is not loaded".to_string(),
            },
            other => ErrorBody {
                error: "Prediction failed",
                message: crate::service::failure_message(&other),
            },
        };
        (status, Json(body)).into_response()
    }
}
