//! Sentiment inference providers.
//!
//! - [`HuggingFaceClient`]: HuggingFace Inference API text classification
//! - [`LexiconProvider`]: offline word-list classifier
//! - [`RetryingProvider`]: retry decorator for any provider

pub mod huggingface;
pub mod lexicon;
pub mod retry;
pub mod traits;

pub use huggingface::HuggingFaceClient;
pub use lexicon::LexiconProvider;
pub use retry::{RetryConfig, RetryingProvider};
pub use traits::SentimentProvider;
