//! Offline word-list sentiment classifier.
//!
//! Counts positive and negative cue words (a preceding negator flips the
//! next cue) and emits POSITIVE or NEGATIVE with a confidence that grows
//! with the margin between the two counts. Deterministic and dependency
//! free, so it serves as the backend when no remote model is configured.

use async_trait::async_trait;

use super::traits::SentimentProvider;
use crate::Result;
use crate::types::RawPrediction;

const POSITIVE: &[&str] = &[
    "amazing", "awesome", "best", "brilliant", "delight", "delightful", "enjoy", "enjoyed",
    "excellent", "fantastic", "favorite", "glad", "good", "great", "happy", "like", "love",
    "loved", "lovely", "nice", "perfect", "pleased", "recommend", "superb", "wonderful",
];

const NEGATIVE: &[&str] = &[
    "angry", "annoying", "awful", "bad", "broken", "disappointed", "disappointing", "dislike",
    "hate", "hated", "horrible", "poor", "refund", "sad", "slow", "terrible", "ugly",
    "unhappy", "useless", "waste", "worse", "worst", "wrong",
];

const NEGATORS: &[&str] = &["not", "no", "never", "don't", "didn't", "isn't", "wasn't", "can't"];

/// Deterministic lexicon-based provider.
#[derive(Debug, Clone, Default)]
pub struct LexiconProvider;

impl LexiconProvider {
    pub fn new() -> Self {
        Self
    }

    /// Score a text without going through the async trait.
    pub fn score(text: &str) -> RawPrediction {
        let mut positive = 0u32;
        let mut negative = 0u32;
        let mut negated = false;

        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
        {
            if NEGATORS.contains(&word) {
                negated = true;
                continue;
            }
            let polarity = if POSITIVE.contains(&word) {
                Some(true)
            } else if NEGATIVE.contains(&word) {
                Some(false)
            } else {
                None
            };
            if let Some(is_positive) = polarity {
                if is_positive != negated {
                    positive += 1;
                } else {
                    negative += 1;
                }
            }
            negated = false;
        }

        let margin = positive.abs_diff(negative) as f64;
        let total = (positive + negative) as f64;
        RawPrediction {
            label: if positive >= negative { "POSITIVE" } else { "NEGATIVE" }.to_string(),
            score: 0.5 + 0.5 * margin / (total + 1.0),
        }
    }
}

#[async_trait]
impl SentimentProvider for LexiconProvider {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<RawPrediction> {
        Ok(Self::score(text))
    }
}
