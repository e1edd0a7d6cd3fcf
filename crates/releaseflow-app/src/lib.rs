//! ReleaseFlow Application Shell
//!
//! Thin host around the security layer: loads configuration, sets up
//! logging, wires platform services and runs startup and background checks.
//! Core logic lives in the library crates under `crates/`.

pub mod commands;
pub mod error;
pub mod state;

use anyhow::Context;
use releaseflow_core::{AppConfig, LoggingConfig};
use releaseflow_security::InitOutcome;
use state::AppState;
use tokio::sync::watch;
use tracing::info;

/// Initialize tracing subscriber for logging
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new("info,releaseflow=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// Run startup checks and keep monitoring until Ctrl-C.
///
/// Returns an error when startup is refused, so the process exits non-zero.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    init_tracing(&config.logging);

    info!("Starting ReleaseFlow v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = AppConfig::data_dir().context("failed to determine data directory")?;
    let state = AppState::new(&config, &data_dir)?;

    let outcome = state.security.initialize().await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if let InitOutcome::Failed { reason, .. } = outcome {
        anyhow::bail!("security initialization refused: {reason}");
    }

    let status = commands::security::security_status(&state).await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let security = state.security.clone();
    let every = state.check_interval;
    let monitor = tokio::spawn(async move { security.monitor(every, shutdown_rx).await });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutting down");

    // the monitor may already have stopped
    let _ = shutdown_tx.send(true);
    monitor.await.context("security monitor panicked")?;
    Ok(())
}
