//! storagebox-exporter: the exporter daemon.
//!
//! Single binary that assembles:
//! - Robot web service client (HTTP Basic, credentials from the environment)
//! - Poller (rate-adaptive update loop)
//! - Gauge registry
//! - Prometheus exposition endpoint
//!
//! # Usage
//!
//! ```text
//! HETZNER_USER=... HETZNER_PASS=... storagebox-exporter --listen :9509 --path /metrics
//! ```

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storagebox_client::RobotClient;
use storagebox_exporter::config::env_lookup;
use storagebox_exporter::{Cli, ExporterConfig, build_router};
use storagebox_metrics::Registry;
use storagebox_poller::Poller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storagebox=debug")),
        )
        .init();

    let config = Cli::parse().into_config(env_lookup)?;
    run(config).await
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    info!(
        api_url = %config.api_url,
        user = %config.credentials.username,
        timeout_secs = config.http_timeout.as_secs(),
        "storage box exporter starting"
    );

    // ── Initialize subsystems ──────────────────────────────────

    let client = RobotClient::new(
        config.api_url.clone(),
        config.credentials.clone(),
        config.http_timeout,
    )?;
    let registry = Registry::new();
    let poller = Poller::new(client, registry.clone()).with_config(config.poller.clone());

    // ── Start background tasks ─────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller_handle = poller.spawn(shutdown_rx.clone());

    // ── Start exposition server ────────────────────────────────

    let router = build_router(registry, &config.path);
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!(addr = %config.listen, path = %config.path, "listening");

    let mut server_shutdown = shutdown_rx;
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = server_shutdown.changed().await;
    });
    let mut server_handle = tokio::spawn(async move { server.await });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to install CTRL+C handler")?;
            info!("shutdown signal received");
        }
        result = &mut poller_handle => {
            // The poller only stops on its own after a fatal decode failure.
            let _ = shutdown_tx.send(true);
            let _ = server_handle.await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!(error = %e, "poller stopped");
                    Err(anyhow::Error::new(e).context("poller stopped on an unrecoverable response"))
                }
                Err(e) => Err(anyhow::Error::new(e).context("poller task failed")),
            };
        }
        result = &mut server_handle => {
            let _ = shutdown_tx.send(true);
            let _ = poller_handle.await;
            let served = result.context("metrics endpoint task failed")?;
            served.context("metrics endpoint failed")?;
            error!("metrics endpoint stopped unexpectedly");
            anyhow::bail!("metrics endpoint stopped unexpectedly");
        }
    }

    let _ = shutdown_tx.send(true);
    server_handle.await??;
    poller_handle.await??;

    info!("storage box exporter stopped");
    Ok(())
}
