//! Prediction request types and their validation.
//!
//! Requests arrive as loosely typed JSON. Parsing goes through
//! [`serde_json::Value`] rather than a derived `Deserialize` so that each
//! structural problem maps to its own client-facing message, and so that
//! malformed batch items can be carried through to the orchestrator (which
//! skips them) instead of failing the whole batch.

use serde_json::Value;

use crate::{MoodringError, Result};

/// Maximum length of a single text, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Maximum number of texts in one batch.
pub const MAX_BATCH_ITEMS: usize = 100;

/// A validated single-text prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub text: String,
    pub use_cache: bool,
}

impl PredictionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            use_cache: true,
        }
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Parse and validate a request body.
    pub fn from_json(body: &Value) -> Result<Self> {
        let fields = body
            .as_object()
            .ok_or_else(|| invalid("'text' field is required"))?;
        let text = fields
            .get("text")
            .ok_or_else(|| invalid("'text' field is required"))?;
        let request = Self {
            text: text
                .as_str()
                .ok_or_else(|| invalid("'text' must be a non-empty string"))?
                .to_string(),
            use_cache: use_cache_flag(body)?,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the text bounds. Runs before any cache or inference work.
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(invalid("'text' must be a non-empty string"));
        }
        if self.text.chars().count() > MAX_TEXT_CHARS {
            return Err(invalid(format!(
                "'text' exceeds maximum length of {MAX_TEXT_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// A structurally valid batch request.
///
/// Items are kept in input order. `None` marks an entry that was not a
/// JSON string; the batch orchestrator skips it, as it does empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPredictionRequest {
    pub texts: Vec<Option<String>>,
    pub use_cache: bool,
}

impl BatchPredictionRequest {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(|t| Some(t.into())).collect(),
            use_cache: true,
        }
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Parse and validate a request body. Only structure is checked here;
    /// item content never rejects the batch.
    pub fn from_json(body: &Value) -> Result<Self> {
        let texts = body
            .as_object()
            .and_then(|fields| fields.get("texts"))
            .ok_or_else(|| invalid("'texts' field is required"))?
            .as_array()
            .ok_or_else(|| invalid("'texts' must be a non-empty list"))?;
        let request = Self {
            texts: texts
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            use_cache: use_cache_flag(body)?,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.texts.is_empty() {
            return Err(invalid("'texts' must be a non-empty list"));
        }
        if self.texts.len() > MAX_BATCH_ITEMS {
            return Err(invalid(format!(
                "'texts' list exceeds maximum length of {MAX_BATCH_ITEMS}"
            )));
        }
        Ok(())
    }
}

/// `use_cache` defaults to true and must be a boolean when present.
fn use_cache_flag(body: &Value) -> Result<bool> {
    match body.get("use_cache") {
        None => Ok(true),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(invalid("'use_cache' must be a boolean")),
    }
}

fn invalid(message: impl Into<String>) -> MoodringError {
    MoodringError::InvalidInput(message.into())
}
