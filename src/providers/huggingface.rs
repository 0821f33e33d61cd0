//! HuggingFace Inference API client for sentiment classification.
//!
//! Uses the serverless text-classification pipeline.
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::traits::SentimentProvider;
use crate::types::RawPrediction;
use crate::{MoodringError, Result};

/// Default base URL for HuggingFace Inference API
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Text used to exercise the model once at startup.
const WARMUP_TEXT: &str = "warm up";

/// Client for HuggingFace text-classification models.
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: Option<String>,
    http: Client,
    base_url: String,
    model: String,
}

impl HuggingFaceClient {
    /// Create a client for `model` against the public Inference API.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (self-hosted endpoints, wiremock).
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MoodringError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Model identifier this client calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify a text and return the highest-scoring label.
    pub async fn classify(&self, text: &str) -> Result<RawPrediction> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        let mut request = self.http.post(&url).json(&ClassifyRequest { inputs: text });
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        let response = request
            .send()
            .await
            .map_err(|e| MoodringError::Http(e.to_string()))?;

        self.handle_response_errors(&response)?;

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| MoodringError::Http(e.to_string()))?;

        body.into_labels()
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .map(|top| RawPrediction {
                label: top.label,
                score: top.score,
            })
            .ok_or(MoodringError::EmptyResponse)
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 | 403 => Err(MoodringError::AuthenticationFailed),
            404 => Err(MoodringError::ModelNotFound(self.model.clone())),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(MoodringError::RateLimited { retry_after })
            }
            503 => Err(MoodringError::Api {
                status: 503,
                message: "Model is loading, please retry".to_string(),
            }),
            code => Err(MoodringError::Api {
                status: code,
                message: format!("HuggingFace API error: {status}"),
            }),
        }
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The pipeline answers `[[{label, score}, ...]]` for a single input;
/// some deployments drop the outer list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn into_labels(self) -> Vec<LabelScore> {
        match self {
            ClassifyResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(labels) => labels,
        }
    }
}

#[async_trait]
impl SentimentProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    /// Runs one classification so that a missing model, bad credentials or
    /// an unreachable endpoint surface at startup.
    async fn load(&self) -> Result<()> {
        let warmup = HuggingFaceClient::classify(self, WARMUP_TEXT).await?;
        info!(model = %self.model, label = %warmup.label, "model warm-up succeeded");
        Ok(())
    }

    async fn classify(&self, text: &str) -> Result<RawPrediction> {
        HuggingFaceClient::classify(self, text).await
    }
}
