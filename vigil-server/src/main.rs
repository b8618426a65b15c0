//! Vigil daemon entry point

use anyhow::Context;
use log::{error, info, warn};
use tokio::net::TcpListener;
use vigil_core::IngestStatusHandle;
use vigil_server::{build_monitor, create_router, spawn_ingestion, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Vigil {} starting: source {}, calibration {}, window {}",
        env!("CARGO_PKG_VERSION"),
        config.source,
        config.pipeline.calibration_samples,
        config.pipeline.window_capacity
    );

    let monitor = build_monitor(&config);
    let ingest = IngestStatusHandle::new();
    // The worker is never joined; it ends with the process
    let _worker = spawn_ingestion(&config, monitor.clone(), ingest.clone())
        .context("failed to spawn ingestion thread")?;

    let state = AppState {
        monitor,
        ingest,
        static_dir: config.static_dir.clone(),
    };
    let app = create_router(state, &config.allowed_origins);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Vigil stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received");
}
