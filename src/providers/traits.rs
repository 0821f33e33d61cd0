//! Provider trait for sentiment inference backends.
//!
//! The inference model is opaque to the rest of the crate: a provider
//! takes text and returns a label with a score, or fails. Decorators such
//! as [`RetryingProvider`](super::RetryingProvider) wrap a provider and
//! implement the same trait.

use async_trait::async_trait;

use crate::Result;
use crate::types::RawPrediction;

/// Backend that classifies text sentiment.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Initialise the backend. Called once at startup; an error leaves the
    /// gateway permanently unavailable.
    ///
    /// Default implementation does nothing.
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    /// Classify one text. The score is the confidence of `label`, in `[0, 1]`.
    async fn classify(&self, text: &str) -> Result<RawPrediction>;
}
