//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus);
//! without a recorder installed, all metric calls are no-ops.
//!
//! All metrics are prefixed with `moodring_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `mode` — "single" or "batch"
//! - `status` — outcome: "ok" or "error"
//! - `operation` — cache operation: "get" or "set"

/// Total prediction requests handled by the orchestrators.
///
/// Labels: `mode`, `status`.
pub const PREDICTIONS_TOTAL: &str = "moodring_predictions_total";

/// Total result cache hits.
pub const CACHE_HITS_TOTAL: &str = "moodring_cache_hits_total";

/// Total result cache misses, including undecodable payloads.
pub const CACHE_MISSES_TOTAL: &str = "moodring_cache_misses_total";

/// Total swallowed cache backend failures.
///
/// Labels: `operation`.
pub const CACHE_ERRORS_TOTAL: &str = "moodring_cache_errors_total";

/// Duration of inference backend calls in seconds.
pub const INFERENCE_DURATION_SECONDS: &str = "moodring_inference_duration_seconds";

/// Total retry attempts against the inference backend.
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "moodring_retries_total";
