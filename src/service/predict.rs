//! Single-text cache-aside flow.

use std::time::Instant;

use tracing::{error, info, warn};

use super::{SentimentService, preview};
use crate::fingerprint::fingerprint;
use crate::telemetry;
use crate::types::{Prediction, PredictionRequest};
use crate::{MoodringError, Result};

impl SentimentService {
    /// Classify one text, serving from the cache when possible.
    ///
    /// Errors: `ModelUnavailable` if the gateway never loaded,
    /// `InvalidInput` if the text is empty or too long, `Inference` if
    /// the backend fails on a miss. Cache problems never surface here.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        let start = Instant::now();
        let outcome = self.predict_inner(request, start).await;
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::PREDICTIONS_TOTAL, "mode" => "single", "status" => status)
            .increment(1);
        outcome
    }

    async fn predict_inner(&self, request: &PredictionRequest, start: Instant) -> Result<Prediction> {
        self.ensure_available()?;
        request.validate().inspect_err(|e| warn!(error = %e, "rejected prediction request"))?;

        let key = fingerprint(&request.text);

        if request.use_cache
            && let Some(result) = self.cache().get(&key).await
        {
            info!(text = preview(&request.text), "cache hit");
            return Ok(Prediction {
                result,
                cached: true,
                processing_time: start.elapsed().as_secs_f64(),
            });
        }

        info!(text = preview(&request.text), "analyzing sentiment");
        let result = self
            .gateway()
            .classify(&request.text)
            .await
            .inspect_err(|e: &MoodringError| error!(error = %e, "prediction error"))?;

        if request.use_cache && self.cache().set(&key, &result).await {
            info!(text = preview(&request.text), "cached result");
        }

        Ok(Prediction {
            result,
            cached: false,
            processing_time: start.elapsed().as_secs_f64(),
        })
    }
}
