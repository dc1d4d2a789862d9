//! srgraph dashboard entry point.

use anyhow::Context;
use srgraph_dashboard::{telemetry, AppState, DashboardConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load().context("failed to load configuration")?;
    telemetry::init(config.log_json).context("failed to initialise logging")?;

    let app = srgraph_dashboard::router(AppState::from_config(&config));

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;

    info!(
        addr = %listener.local_addr()?,
        data_dir = %config.data_dir.display(),
        policy = ?config.malformed_policy(),
        "srgraph dashboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("srgraph dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
