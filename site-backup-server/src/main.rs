mod config;
mod error;
mod routes;
mod state;
mod ws;

use crate::config::AppConfig;
use crate::state::AppState;
use site_backup::config::LogConfig;
use site_backup::executor::BackupPipeline;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting site-backup-server on port {}", config.port);

    routes::health::init_start_time();

    // Build the pipeline with the production HTTP collaborators
    let pipeline_config = site_backup::Config {
        store: config.store.clone(),
        storage: config.storage.clone(),
        backup: config.backup.clone(),
        log: LogConfig {
            level: "info".into(),
        },
    };
    let pipeline = BackupPipeline::from_config(&pipeline_config);

    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
