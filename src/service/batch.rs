//! Batch cache-aside flow.

use std::time::Instant;

use tracing::{debug, error, info};

use super::{SentimentService, failure_message, preview};
use crate::Result;
use crate::fingerprint::fingerprint;
use crate::telemetry;
use crate::types::{BatchEntry, BatchPrediction, BatchPredictionRequest};

impl SentimentService {
    /// Classify a list of texts in order.
    ///
    /// The whole batch is rejected only if the gateway never loaded or the
    /// list is structurally invalid. Non-string and empty items are skipped
    /// without a trace in the output. An item whose classification fails
    /// becomes an error entry and the batch carries on.
    pub async fn predict_batch(&self, request: &BatchPredictionRequest) -> Result<BatchPrediction> {
        let outcome = self.predict_batch_inner(request).await;
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::PREDICTIONS_TOTAL, "mode" => "batch", "status" => status)
            .increment(1);
        outcome
    }

    async fn predict_batch_inner(&self, request: &BatchPredictionRequest) -> Result<BatchPrediction> {
        let start = Instant::now();
        self.ensure_available()?;
        request.validate()?;

        let mut results = Vec::with_capacity(request.texts.len());
        let mut cached_count = 0;

        for (index, item) in request.texts.iter().enumerate() {
            let Some(text) = item.as_deref().filter(|t| !t.is_empty()) else {
                debug!(index, "skipping malformed batch item");
                continue;
            };
            let key = fingerprint(text);

            if request.use_cache
                && let Some(hit) = self.cache().get(&key).await
            {
                results.push(BatchEntry::Result(hit));
                cached_count += 1;
                continue;
            }

            match self.gateway().classify(text).await {
                Ok(result) => {
                    if request.use_cache {
                        self.cache().set(&key, &result).await;
                    }
                    results.push(BatchEntry::Result(result));
                }
                Err(e) => {
                    error!(index, text = preview(text), error = %e, "prediction error for batch item");
                    results.push(BatchEntry::Error {
                        text: text.to_string(),
                        error: failure_message(&e),
                    });
                }
            }
        }

        let failed = results.iter().filter(|entry| entry.is_error()).count();
        info!(
            submitted = request.texts.len(),
            total = results.len(),
            cached_count,
            failed,
            "batch prediction finished"
        );
        Ok(BatchPrediction {
            total: results.len(),
            results,
            cached_count,
            processing_time: start.elapsed().as_secs_f64(),
        })
    }
}
