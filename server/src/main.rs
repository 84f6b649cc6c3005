//! Exposure Watch - Main Entry Point
//!
//! Schedules audit passes and serves the health and manual-trigger endpoints.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use exposure_watch::{api, audit, config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exposure_watch=info,tower_http=info".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;
    let guilds = config::load_guilds(&config.guilds_config_path).with_context(|| {
        format!(
            "Failed to load guild list from {}",
            config.guilds_config_path.display()
        )
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        guilds = guilds.len(),
        interval_secs = config.audit_interval_secs,
        role_baseline = config.audit_role_baseline,
        "Starting Exposure Watch"
    );

    let runner = Arc::new(
        audit::AuditRunner::from_config(&config, guilds).context("Failed to build HTTP client")?,
    );

    // Scheduled audits
    let scheduler = audit::spawn_audit_task(
        runner.clone(),
        config.audit_interval(),
        config.audit_on_startup,
    );

    let app = api::create_router(api::AppState::new(runner));

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    scheduler.abort();
    info!("Server shutdown complete");

    Ok(())
}
