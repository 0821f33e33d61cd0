//! Sentiment result and response envelope types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentiment label reported by the inference backend.
///
/// The two labels of binary sentiment models get their own variants;
/// anything else the backend emits is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Other(String),
}

impl SentimentLabel {
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Other(label) => label,
        }
    }
}

impl From<String> for SentimentLabel {
    fn from(label: String) -> Self {
        match label.as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            _ => SentimentLabel::Other(label),
        }
    }
}

impl From<&str> for SentimentLabel {
    fn from(label: &str) -> Self {
        SentimentLabel::from(label.to_string())
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of an inference backend, before rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

/// A classified text. This is the unit stored in the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub text: String,
    pub sentiment: SentimentLabel,
    /// Confidence in `[0, 1]`, rounded to four decimal places.
    pub confidence: f64,
}

impl SentimentResult {
    /// Build a result from raw backend output, rounding the score.
    pub fn from_raw(text: impl Into<String>, raw: RawPrediction) -> Self {
        Self {
            text: text.into(),
            sentiment: SentimentLabel::from(raw.label),
            confidence: round_confidence(raw.score),
        }
    }
}

/// Round a confidence score to four decimal places.
///
/// Applied before both caching and responding, so a cached value and a
/// fresh computation of the same text compare bit-identical.
pub fn round_confidence(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// A [`SentimentResult`] decorated with per-request fields. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub result: SentimentResult,
    pub cached: bool,
    /// Wall-clock seconds since the request started.
    pub processing_time: f64,
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Result(SentimentResult),
    Error { text: String, error: String },
}

impl BatchEntry {
    pub fn is_error(&self) -> bool {
        matches!(self, BatchEntry::Error { .. })
    }
}

/// Aggregated response of a batch prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub results: Vec<BatchEntry>,
    pub total: usize,
    pub cached_count: usize,
    pub processing_time: f64,
}
