//! HTTP server for the prediction service.
//!
//! This module provides:
//! - The axum router and handlers (`routes`)
//! - Request logging middleware (`middleware`)
//! - Configuration types (`config`)
//! - [`build_service`] to assemble a [`SentimentService`] from configuration

pub mod config;
pub mod middleware;
pub mod routes;

pub use routes::{ApiError, router};

use tracing::info;

use crate::cache::ResultCache;
use crate::gateway::InferenceGateway;
use crate::service::SentimentService;
use crate::Result;
use config::{Config, Secrets};

/// Connect the cache and load the model described by `config`.
///
/// Only a malformed configuration is an error. An unreachable cache
/// yields a disabled cache and a model that fails to load yields an
/// unavailable gateway; the service starts either way and reports the
/// condition through `/health`.
pub async fn build_service(config: &Config, secrets: &Secrets) -> Result<SentimentService> {
    let cache = ResultCache::connect(&config.cache_config()).await;
    let provider = config.model.build_provider(secrets.huggingface_key())?;
    let gateway = InferenceGateway::load(provider, &config.model.name).await;
    info!(
        cache = cache.backend_name(),
        model = gateway.model(),
        model_available = gateway.is_available(),
        "service assembled"
    );
    Ok(SentimentService::new(cache, gateway))
}
