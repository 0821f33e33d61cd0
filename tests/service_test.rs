//! Cache-aside behaviour of the prediction service.
//!
//! Uses counting mock providers over the in-memory backend, plus a cache
//! backend that fails on demand to check that cache trouble never reaches
//! the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moodring::cache::{CacheBackend, MemoryBackend, ResultCache};
use moodring::providers::SentimentProvider;
use moodring::types::{
    BatchEntry, BatchPredictionRequest, CheckStatus, OverallStatus, PredictionRequest,
    RawPrediction, SentimentLabel,
};
use moodring::{InferenceGateway, MoodringError, Result, SentimentService, fingerprint};

// ============================================================================
// Mocks
// ============================================================================

/// Answers POSITIVE/0.998734 for everything except texts containing "boom".
struct CountingProvider {
    calls: AtomicU32,
}

impl CountingProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SentimentProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn classify(&self, text: &str) -> Result<RawPrediction> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if text.contains("boom") {
            return Err(MoodringError::Api {
                status: 500,
                message: "backend exploded".into(),
            });
        }
        Ok(RawPrediction {
            label: "POSITIVE".into(),
            score: 0.998734,
        })
    }
}

struct FailsToLoad;

#[async_trait]
impl SentimentProvider for FailsToLoad {
    fn name(&self) -> &str {
        "fails-to-load"
    }

    async fn load(&self) -> Result<()> {
        Err(MoodringError::AuthenticationFailed)
    }

    async fn classify(&self, _text: &str) -> Result<RawPrediction> {
        panic!("classify must not be reached on an unloaded gateway");
    }
}

/// Memory backend whose operations can be switched to fail after startup.
struct FlakyBackend {
    inner: MemoryBackend,
    broken: AtomicBool,
}

impl FlakyBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryBackend::default(),
            broken: AtomicBool::new(false),
        })
    }

    fn break_now(&self) {
        self.broken.store(true, Ordering::Relaxed);
    }

    fn check(&self) -> Result<()> {
        if self.broken.load(Ordering::Relaxed) {
            Err(MoodringError::Cache("connection reset".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheBackend for FlakyBackend {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check()?;
        self.inner.set_ex(key, value, ttl).await
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

// ============================================================================
// Helpers
// ============================================================================

const TTL: Duration = Duration::from_secs(3600);

async fn memory_cache() -> ResultCache {
    ResultCache::with_backend(Arc::new(MemoryBackend::default()), TTL).await
}

async fn service_with(cache: ResultCache, provider: Arc<CountingProvider>) -> SentimentService {
    let gateway = InferenceGateway::load(provider, "test-model").await;
    SentimentService::new(cache, gateway)
}

fn result_of(entry: &BatchEntry) -> &moodring::SentimentResult {
    match entry {
        BatchEntry::Result(result) => result,
        BatchEntry::Error { text, error } => panic!("unexpected error entry for {text}: {error}"),
    }
}

// ============================================================================
// Single prediction
// ============================================================================

#[tokio::test]
async fn second_identical_request_is_served_from_cache() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;
    let request = PredictionRequest::new("I love this product!");

    let first = service.predict(&request).await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.result.sentiment, SentimentLabel::Positive);
    assert_eq!(first.result.confidence, 0.9987);
    assert_eq!(first.result.text, "I love this product!");

    let second = service.predict(&request).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.result, first.result);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn use_cache_false_bypasses_read_and_write() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;
    let request = PredictionRequest::new("Meh").use_cache(false);

    assert!(!service.predict(&request).await.unwrap().cached);
    assert!(!service.predict(&request).await.unwrap().cached);
    assert_eq!(provider.calls(), 2);
    assert!(service.cache().get(&fingerprint("Meh")).await.is_none());
}

#[tokio::test]
async fn use_cache_false_ignores_existing_entry() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;

    service.predict(&PredictionRequest::new("warm")).await.unwrap();
    let bypass = service
        .predict(&PredictionRequest::new("warm").use_cache(false))
        .await
        .unwrap();

    assert!(!bypass.cached);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn disabled_cache_never_reports_cached() {
    let provider = CountingProvider::new();
    let service = service_with(ResultCache::disabled(), provider.clone()).await;
    let request = PredictionRequest::new("same text");

    for _ in 0..3 {
        assert!(!service.predict(&request).await.unwrap().cached);
    }
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn cache_failures_after_startup_do_not_surface() {
    let backend = FlakyBackend::new();
    let cache = ResultCache::with_backend(backend.clone(), TTL).await;
    assert!(cache.is_available());

    let provider = CountingProvider::new();
    let service = service_with(cache, provider.clone()).await;
    backend.break_now();

    let prediction = service.predict(&PredictionRequest::new("still works")).await.unwrap();
    assert!(!prediction.cached);
    assert_eq!(prediction.result.confidence, 0.9987);

    let health = service.health().await;
    assert_eq!(health.status, OverallStatus::Degraded);
    assert_eq!(health.checks["flaky"], CheckStatus::Unhealthy);
}

#[tokio::test]
async fn validation_runs_before_any_work() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;

    let empty = service.predict(&PredictionRequest::new("")).await;
    assert!(matches!(empty, Err(MoodringError::InvalidInput(_))));

    let long = service
        .predict(&PredictionRequest::new("a".repeat(5001)))
        .await;
    assert!(matches!(long, Err(MoodringError::InvalidInput(_))));

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn text_at_length_limit_is_accepted() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider).await;

    let prediction = service
        .predict(&PredictionRequest::new("é".repeat(5000)))
        .await
        .unwrap();
    assert_eq!(prediction.result.text.chars().count(), 5000);
}

#[tokio::test]
async fn inference_failure_is_reported_and_not_cached() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;

    let err = service
        .predict(&PredictionRequest::new("boom"))
        .await
        .unwrap_err();
    assert!(matches!(err, MoodringError::Inference(_)));
    assert!(service.cache().get(&fingerprint("boom")).await.is_none());
}

#[tokio::test]
async fn unloaded_model_rejects_everything() {
    let gateway = InferenceGateway::load(Arc::new(FailsToLoad), "test-model").await;
    let service = SentimentService::new(memory_cache().await, gateway);

    // Availability is checked before validation, so even an empty text gets 503 semantics.
    let err = service.predict(&PredictionRequest::new("")).await.unwrap_err();
    assert!(matches!(err, MoodringError::ModelUnavailable));

    let err = service
        .predict_batch(&BatchPredictionRequest::new(["a", "b"]))
        .await
        .unwrap_err();
    assert!(matches!(err, MoodringError::ModelUnavailable));

    let health = service.health().await;
    assert_eq!(health.status, OverallStatus::Unhealthy);
    assert_eq!(health.checks["model"], CheckStatus::Unhealthy);
    assert_eq!(health.checks["memory"], CheckStatus::Healthy);
}

// ============================================================================
// Batch prediction
// ============================================================================

#[tokio::test]
async fn batch_counts_hits() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;
    service.predict(&PredictionRequest::new("seen before")).await.unwrap();

    let batch = service
        .predict_batch(&BatchPredictionRequest::new(["seen before", "brand new"]))
        .await
        .unwrap();

    assert_eq!(batch.total, 2);
    assert_eq!(batch.cached_count, 1);
    assert_eq!(result_of(&batch.results[0]).text, "seen before");
    assert_eq!(result_of(&batch.results[1]).text, "brand new");
    assert_eq!(provider.calls(), 2);

    // Misses were written back.
    let again = service
        .predict_batch(&BatchPredictionRequest::new(["seen before", "brand new"]))
        .await
        .unwrap();
    assert_eq!(again.cached_count, 2);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn batch_item_failure_does_not_abort_batch() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider).await;

    let batch = service
        .predict_batch(&BatchPredictionRequest::new(["fine", "boom here", "also fine"]))
        .await
        .unwrap();

    assert_eq!(batch.total, 3);
    assert_eq!(batch.cached_count, 0);
    assert!(!batch.results[0].is_error());
    assert!(!batch.results[2].is_error());
    match &batch.results[1] {
        BatchEntry::Error { text, error } => {
            assert_eq!(text, "boom here");
            assert!(!error.is_empty());
        }
        other => panic!("expected error entry, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_skips_empty_and_non_string_items() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider.clone()).await;
    let body = serde_json::json!({"texts": ["first", "", 42, null, "second"]});
    let request = BatchPredictionRequest::from_json(&body).unwrap();

    let batch = service.predict_batch(&request).await.unwrap();

    assert_eq!(batch.total, 2);
    assert_eq!(batch.results.len(), 2);
    assert_eq!(result_of(&batch.results[0]).text, "first");
    assert_eq!(result_of(&batch.results[1]).text, "second");
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn batch_without_cache_does_not_populate() {
    let provider = CountingProvider::new();
    let service = service_with(memory_cache().await, provider).await;

    let batch = service
        .predict_batch(&BatchPredictionRequest::new(["x"]).use_cache(false))
        .await
        .unwrap();

    assert_eq!(batch.cached_count, 0);
    assert!(service.cache().get(&fingerprint("x")).await.is_none());
}

#[tokio::test]
async fn batch_size_boundary() {
    let provider = CountingProvider::new();
    let service = service_with(ResultCache::disabled(), provider).await;

    let full: Vec<String> = (0..100).map(|i| format!("text {i}")).collect();
    let batch = service
        .predict_batch(&BatchPredictionRequest::new(full))
        .await
        .unwrap();
    assert_eq!(batch.total, 100);

    let over: Vec<String> = (0..101).map(|i| format!("text {i}")).collect();
    let err = service
        .predict_batch(&BatchPredictionRequest::new(over))
        .await
        .unwrap_err();
    assert!(matches!(err, MoodringError::InvalidInput(_)));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_reflects_cache_state() {
    let healthy = service_with(memory_cache().await, CountingProvider::new()).await;
    let before = chrono::Utc::now();
    let report = healthy.health().await;
    assert!(report.timestamp >= before);
    assert!(report.timestamp <= chrono::Utc::now());
    assert_eq!(report.status, OverallStatus::Healthy);
    assert_eq!(report.checks["model"], CheckStatus::Healthy);
    assert_eq!(report.checks["memory"], CheckStatus::Healthy);
    assert_eq!(report.service, "sentiment-analysis-api");

    let degraded = service_with(ResultCache::disabled(), CountingProvider::new()).await;
    let report = degraded.health().await;
    assert_eq!(report.status, OverallStatus::Degraded);
    // A disabled cache still reports under `redis`, the key health checks read.
    assert_eq!(report.checks["redis"], CheckStatus::Unavailable);
    assert_eq!(report.checks.len(), 2);
}
