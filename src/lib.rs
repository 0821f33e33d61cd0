//! Moodring - cached sentiment classification
//!
//! This crate serves text sentiment classification behind a
//! content-addressed result cache. Each text is fingerprinted; a lookup
//! in the [`ResultCache`] either answers directly or falls through to the
//! [`InferenceGateway`], whose answer is written back for next time. The
//! cache is strictly an optimisation: when it is unreachable every request
//! is still served, only slower.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use moodring::cache::{MemoryBackend, ResultCache};
//! use moodring::providers::LexiconProvider;
//! use moodring::{InferenceGateway, PredictionRequest, SentimentService};
//!
//! # #[tokio::main]
//! # async fn main() -> moodring::Result<()> {
//! let cache = ResultCache::with_backend(
//!     Arc::new(MemoryBackend::default()),
//!     Duration::from_secs(3600),
//! )
//! .await;
//! let gateway = InferenceGateway::load(Arc::new(LexiconProvider::new()), "lexicon").await;
//! let service = SentimentService::new(cache, gateway);
//!
//! let first = service.predict(&PredictionRequest::new("I love this product")).await?;
//! let second = service.predict(&PredictionRequest::new("I love this product")).await?;
//! assert!(!first.cached && second.cached);
//! assert_eq!(first.result, second.result);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod gateway;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheBackend, CacheConfig, ResultCache};
pub use error::{MoodringError, Result};
pub use fingerprint::fingerprint;
pub use gateway::InferenceGateway;
pub use providers::SentimentProvider;
pub use service::SentimentService;
pub use version::{PKG_VERSION, version_string};

pub use types::{
    BatchEntry, BatchPrediction, BatchPredictionRequest, CheckStatus, HealthStatus,
    OverallStatus, Prediction, PredictionRequest, RawPrediction, SentimentLabel, SentimentResult,
};
