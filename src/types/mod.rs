//! Public types for the Moodring API.

mod health;
mod request;
mod sentiment;

pub use health::{CheckStatus, HealthStatus, OverallStatus};
pub use request::{BatchPredictionRequest, MAX_BATCH_ITEMS, MAX_TEXT_CHARS, PredictionRequest};
pub use sentiment::{
    BatchEntry, BatchPrediction, Prediction, RawPrediction, SentimentLabel, SentimentResult,
    round_confidence,
};
