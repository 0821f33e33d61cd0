//! Config and secrets files on disk, and service assembly from config.
#![cfg(feature = "server")]

use std::io::Write;
use std::time::Duration;

use moodring::InferenceGateway;
use moodring::providers::RetryConfig;
use moodring::server::build_service;
use moodring::server::config::{Config, ModelConfig, Secrets};
use moodring::types::{CheckStatus, OverallStatus};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_explicit_config_file() {
    let file = write_file(
        r#"
        [server]
        port = 7000

        [cache]
        backend = "disabled"

        [model]
        backend = "lexicon"
        "#,
    );

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.model.name, "distilbert-base-uncased-finetuned-sst-2-english");
}

#[test]
fn malformed_config_is_rejected() {
    let file = write_file("[server\nport = ");
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn unknown_cache_backend_is_rejected() {
    let file = write_file("[cache]\nbackend = \"memcached\"\n");
    assert!(Config::load_from_file(file.path()).is_err());
}

#[cfg(unix)]
#[test]
fn secrets_require_private_permissions() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let file = write_file("[huggingface]\napi_key = \"hf_secret\"\n");

    fs::set_permissions(file.path(), fs::Permissions::from_mode(0o644)).unwrap();
    let err = Secrets::check_permissions(file.path()).unwrap_err();
    assert!(err.to_string().contains("insecure permissions"));

    fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600)).unwrap();
    Secrets::check_permissions(file.path()).unwrap();

    let secrets = Secrets::load_from_file(file.path()).unwrap();
    assert_eq!(secrets.huggingface_key(), Some("hf_secret".to_string()));
}

#[tokio::test]
async fn build_service_with_memory_cache_and_lexicon() {
    let file = write_file(
        r#"
        [cache]
        backend = "memory"

        [model]
        backend = "lexicon"
        "#,
    );
    let config = Config::load(Some(file.path())).unwrap();

    let service = build_service(&config, &Secrets::default()).await.unwrap();

    assert!(service.gateway().is_available());
    assert_eq!(service.cache().backend_name(), "memory");
    assert_eq!(service.health().await.status, OverallStatus::Healthy);
}

#[tokio::test]
async fn build_service_survives_unreachable_dependencies() {
    let file = write_file(
        r#"
        [cache]
        backend = "redis"
        host = "127.0.0.1"
        port = 1
        connect_timeout_secs = 1

        [model]
        base_url = "http://127.0.0.1:1"
        timeout_secs = 1

        [model.retry]
        max_attempts = 1
        "#,
    );
    let config = Config::load(Some(file.path())).unwrap();

    let service = build_service(&config, &Secrets::default()).await.unwrap();

    assert!(!service.cache().is_available());
    assert!(!service.gateway().is_available());
    let health = service.health().await;
    assert_eq!(health.status, OverallStatus::Unhealthy);
    assert_eq!(health.checks["redis"], CheckStatus::Unavailable);
}

/// Answers 503 once, then a normal classification.
async fn loading_then_ready() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/m"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
            {"label": "NEGATIVE", "score": 0.81}
        ]])))
        .mount(&server)
        .await;
    server
}

fn huggingface_model(server: &MockServer, retry: RetryConfig) -> ModelConfig {
    ModelConfig {
        name: "m".to_string(),
        base_url: Some(server.uri()),
        timeout_secs: 5,
        retry,
        ..ModelConfig::default()
    }
}

#[tokio::test]
async fn configured_retry_wraps_huggingface_classify() {
    let server = loading_then_ready().await;
    let retry = RetryConfig::new().initial_delay(Duration::from_millis(1));
    let provider = huggingface_model(&server, retry).build_provider(None).unwrap();

    let prediction = provider.classify("meh").await.unwrap();
    assert_eq!(prediction.label, "NEGATIVE");
}

#[tokio::test]
async fn single_attempt_config_is_not_wrapped() {
    let server = loading_then_ready().await;
    let provider = huggingface_model(&server, RetryConfig::disabled())
        .build_provider(None)
        .unwrap();

    assert!(provider.classify("meh").await.is_err());
}

#[tokio::test]
async fn configured_provider_survives_model_loading_at_startup() {
    let server = loading_then_ready().await;
    let retry = RetryConfig::new().initial_delay(Duration::from_millis(1));
    let provider = huggingface_model(&server, retry).build_provider(None).unwrap();

    let gateway = InferenceGateway::load(provider, "m").await;

    assert!(gateway.is_available());
    assert_eq!(gateway.classify("meh").await.unwrap().confidence, 0.81);
}
