//! moodringd — sentiment prediction daemon.
//!
//! Serves the prediction service over HTTP/JSON.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use moodring::server::config::{Config, Secrets};
use moodring::server::{build_service, router};

/// moodring daemon — cached sentiment classification service.
#[derive(Parser)]
#[command(name = "moodringd")]
#[command(version = moodring::PKG_VERSION)]
#[command(about = "Sentiment analysis API with a content-addressed result cache")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Listen port, overriding config file and PORT.
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration; environment overrides the file, flags override both
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.server.debug |= args.debug;

    init_tracing(config.server.debug);

    let secrets = Secrets::load()?;
    let service = Arc::new(build_service(&config, &secrets).await?);

    let app = router(service).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr = config.server.address();
    let listener = TcpListener::bind(&addr).await?;
    info!(version = moodring::version_string(), %addr, "moodringd starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("moodringd stopped");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
