//! Configuration loading for moodringd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.moodring/config.toml` (user)
//! 3. `/etc/moodring/config.toml` (system)
//!
//! With no file at all, built-in defaults apply. Environment variables are
//! applied on top of whatever was loaded (see [`Config::apply_env`]).
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.moodring/secrets.toml` (user, must be 0600)
//! 2. `/etc/moodring/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{BackendKind, CacheConfig};
use crate::providers::huggingface::DEFAULT_BASE_URL;
use crate::providers::{
    HuggingFaceClient, LexiconProvider, RetryConfig, RetryingProvider, SentimentProvider,
};
use crate::{MoodringError, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub model: ModelConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 0.0.0.0).
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 5000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Verbose logging (default: false).
    #[serde(default)]
    pub debug: bool,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

/// Result cache configuration, as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    /// Entry time-to-live in seconds (default: 3600).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_op_timeout")]
    pub op_timeout_ms: u64,
    /// Capacity of the memory backend (default: 10000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
            ttl_secs: default_ttl(),
            connect_timeout_secs: default_connect_timeout(),
            op_timeout_ms: default_op_timeout(),
            max_entries: default_max_entries(),
        }
    }
}

impl From<&CacheSection> for CacheConfig {
    fn from(section: &CacheSection) -> Self {
        CacheConfig::new()
            .backend(section.backend)
            .redis(section.host.clone(), section.port, section.db)
            .ttl(Duration::from_secs(section.ttl_secs))
            .connect_timeout(Duration::from_secs(section.connect_timeout_secs))
            .op_timeout(Duration::from_millis(section.op_timeout_ms))
            .max_entries(section.max_entries)
    }
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_ttl() -> u64 {
    3600
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_op_timeout() -> u64 {
    1000
}

fn default_max_entries() -> u64 {
    10_000
}

/// Which inference backend to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    #[default]
    HuggingFace,
    Lexicon,
}

impl std::str::FromStr for ModelBackend {
    type Err = MoodringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huggingface" => Ok(ModelBackend::HuggingFace),
            "lexicon" => Ok(ModelBackend::Lexicon),
            other => Err(MoodringError::Configuration(format!(
                "unknown model backend '{other}' (expected huggingface or lexicon)"
            ))),
        }
    }
}

/// Inference backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub backend: ModelBackend,
    /// Model identifier (default: distilbert-base-uncased-finetuned-sst-2-english).
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Inference endpoint (default: the public HuggingFace Inference API).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-call timeout in seconds (default: 30).
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            name: default_model_name(),
            base_url: None,
            timeout_secs: default_model_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Construct the configured provider, with retries when enabled.
    pub fn build_provider(&self, api_key: Option<String>) -> Result<Arc<dyn SentimentProvider>> {
        let provider: Arc<dyn SentimentProvider> = match self.backend {
            ModelBackend::Lexicon => return Ok(Arc::new(LexiconProvider::new())),
            ModelBackend::HuggingFace => Arc::new(HuggingFaceClient::with_base_url(
                &self.name,
                api_key,
                self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
                Duration::from_secs(self.timeout_secs),
            )?),
        };
        if self.retry.max_attempts > 1 {
            Ok(Arc::new(RetryingProvider::new(provider, self.retry.clone())))
        } else {
            Ok(provider)
        }
    }
}

fn default_model_name() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_model_timeout() -> u64 {
    30
}

/// Environment variables applied over the loaded file.
pub const ENV_OVERRIDES: &[&str] = &[
    "REDIS_HOST",
    "REDIS_PORT",
    "REDIS_DB",
    "CACHE_EXPIRY",
    "MODEL_NAME",
    "PORT",
    "DEBUG",
    "MOODRING_CACHE_BACKEND",
    "MOODRING_MODEL_BACKEND",
];

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; an error if missing)
    /// 2. `~/.moodring/config.toml`
    /// 3. `/etc/moodring/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MoodringError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MoodringError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MoodringError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".moodring").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/moodring/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply environment overrides, looking each name up through `lookup`.
    ///
    /// `moodringd` passes `std::env::var`; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("REDIS_HOST") {
            self.cache.host = host;
        }
        if let Some(port) = lookup("REDIS_PORT") {
            self.cache.port = parse_env("REDIS_PORT", &port)?;
        }
        if let Some(db) = lookup("REDIS_DB") {
            self.cache.db = parse_env("REDIS_DB", &db)?;
        }
        if let Some(ttl) = lookup("CACHE_EXPIRY") {
            self.cache.ttl_secs = parse_env("CACHE_EXPIRY", &ttl)?;
        }
        if let Some(backend) = lookup("MOODRING_CACHE_BACKEND") {
            self.cache.backend = backend.parse()?;
        }
        if let Some(name) = lookup("MODEL_NAME") {
            self.model.name = name;
        }
        if let Some(backend) = lookup("MOODRING_MODEL_BACKEND") {
            self.model.backend = backend.parse()?;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        if let Some(debug) = lookup("DEBUG") {
            self.server.debug = debug.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    /// Result cache settings in library form.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::from(&self.cache)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        MoodringError::Configuration(format!("Invalid value for {name}: {value:?}"))
    })
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub huggingface: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Environment variable consulted when no secrets file provides a key.
const HUGGINGFACE_ENV_VAR: &str = "HF_API_KEY";

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment, and public models work without one).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".moodring").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/moodring/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MoodringError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MoodringError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            MoodringError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(MoodringError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// HuggingFace API key, falling back to `HF_API_KEY`.
    pub fn huggingface_key(&self) -> Option<String> {
        self.huggingface
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(HUGGINGFACE_ENV_VAR).ok())
    }
}
