//! Inference gateway.
//!
//! [`InferenceGateway`] is the boundary around the opaque inference
//! backend. It loads the provider once at startup and afterwards either
//! forwards classifications (translating failures into
//! [`MoodringError::Inference`]) or, if loading failed, rejects every call
//! with [`MoodringError::ModelUnavailable`] without touching the provider.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::providers::SentimentProvider;
use crate::telemetry;
use crate::types::{CheckStatus, SentimentResult};
use crate::{MoodringError, Result};

pub struct InferenceGateway {
    provider: Option<Arc<dyn SentimentProvider>>,
    model: String,
}

impl InferenceGateway {
    /// Load `provider`. A failed load yields an unavailable gateway.
    pub async fn load(provider: Arc<dyn SentimentProvider>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(provider = provider.name(), %model, "loading sentiment analysis model");
        match provider.load().await {
            Ok(()) => {
                info!(provider = provider.name(), %model, "model loaded successfully");
                Self {
                    provider: Some(provider),
                    model,
                }
            }
            Err(e) => {
                error!(provider = provider.name(), %model, error = %e, "failed to load model");
                Self::unavailable(model)
            }
        }
    }

    /// A gateway whose backend never loaded.
    pub fn unavailable(model: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: model.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Model identifier, reported by the metadata endpoint.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn status(&self) -> CheckStatus {
        if self.is_available() {
            CheckStatus::Healthy
        } else {
            CheckStatus::Unhealthy
        }
    }

    /// Classify `text`. The confidence in the result is already rounded.
    pub async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let provider = self.provider.as_ref().ok_or(MoodringError::ModelUnavailable)?;

        let start = Instant::now();
        let outcome = provider.classify(text).await;
        metrics::histogram!(telemetry::INFERENCE_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(raw) => Ok(SentimentResult::from_raw(text, raw)),
            Err(MoodringError::Inference(msg)) => Err(MoodringError::Inference(msg)),
            Err(e) => Err(MoodringError::Inference(e.to_string())),
        }
    }
}
