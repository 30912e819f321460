//! beacon - simulated autoscaler service.
//!
//! Runs the control loop in the background and serves the state over HTTP.
//!
//! ```text
//! beacon --port 8123 --config beacon.toml
//! ```

use std::net::SocketAddr;
#[cfg(feature = "config-toml")]
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use beacon::{build_router, AutoscalerConfig, AutoscalerEngine, StateStore};

#[derive(Parser, Debug)]
#[command(name = "beacon", about = "Simulated replica autoscaler with an HTTP control surface")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "8123")]
    port: u16,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// TOML configuration file
    #[cfg(feature = "config-toml")]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the control loop interval in seconds
    #[arg(long)]
    interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config = load_config(&args)?;
    if let Some(seconds) = args.interval_secs {
        config.evaluation_interval_seconds = seconds;
    }
    config.validate()?;

    let store = StateStore::from_config(&config)?;
    let engine = AutoscalerEngine::new(config, store.clone())?;

    #[cfg(feature = "prometheus-metrics")]
    let metrics = {
        let metrics = std::sync::Arc::new(beacon::MetricsObserver::new()?);
        metrics.record_state(&store.read().await);
        metrics
    };
    #[cfg(feature = "prometheus-metrics")]
    let engine = engine.add_observer(metrics.clone());

    let (handle, engine_task) = engine.spawn();

    let router = build_router(store);
    #[cfg(feature = "prometheus-metrics")]
    let router = beacon::api::with_metrics(router, metrics);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Starting server on port {}", args.port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    handle.shutdown().await?;
    engine_task.await??;
    info!("beacon stopped");
    Ok(())
}

#[cfg(feature = "config-toml")]
fn load_config(args: &Args) -> anyhow::Result<AutoscalerConfig> {
    match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            AutoscalerConfig::from_toml_file(path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        None => Ok(AutoscalerConfig::default()),
    }
}

#[cfg(not(feature = "config-toml"))]
fn load_config(_args: &Args) -> anyhow::Result<AutoscalerConfig> {
    Ok(AutoscalerConfig::default())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
