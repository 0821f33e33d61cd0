//! Prediction orchestration.
//!
//! [`SentimentService`] is the process-wide context handed to every
//! request handler. It owns the [`ResultCache`] and the
//! [`InferenceGateway`], both constructed once at startup and only read
//! afterwards, and implements the cache-aside flows on top of them:
//!
//! - [`predict`](SentimentService::predict): validate one text, look up
//!   the fingerprint, on a miss classify and populate the cache.
//! - [`predict_batch`](SentimentService::predict_batch): the same flow per
//!   item, sequentially, where one item's failure never aborts the batch.
//! - [`health`](SentimentService::health): aggregate dependency status.
//!
//! Concurrent misses on the same text are not coalesced. Both requests
//! classify and both write the cache; the writes carry the same value.

mod batch;
mod health;
mod predict;

use crate::cache::ResultCache;
use crate::gateway::InferenceGateway;
use crate::{MoodringError, Result};

/// Shared state for the prediction endpoints.
pub struct SentimentService {
    cache: ResultCache,
    gateway: InferenceGateway,
}

impl SentimentService {
    pub fn new(cache: ResultCache, gateway: InferenceGateway) -> Self {
        Self { cache, gateway }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn gateway(&self) -> &InferenceGateway {
        &self.gateway
    }

    /// Fail with [`MoodringError::ModelUnavailable`] if the model never loaded.
    ///
    /// Checked before a request body is even parsed.
    pub fn ensure_available(&self) -> Result<()> {
        if self.gateway.is_available() {
            Ok(())
        } else {
            tracing::error!("model not loaded");
            Err(MoodringError::ModelUnavailable)
        }
    }
}

/// First 50 characters of a text, for log lines.
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Client-facing message for a failed classification.
pub(crate) fn failure_message(err: &MoodringError) -> String {
    match err {
        MoodringError::Inference(msg) => msg.clone(),
        other => other.to_string(),
    }
}
