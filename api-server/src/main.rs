use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;

use altamedica_api::{app, config::Config, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    telemetry::init(&config);

    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid HOST {:?}", config.host))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        platform = %config.platform,
        port = config.port,
        "AltaMedica API Server running on {} - Port {}",
        config.platform,
        config.port
    );
    tracing::info!(environment = %config.environment(), "Environment: {}", config.environment());

    axum::serve(listener, app::build_app(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
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

    tracing::info!("shutdown signal received");
}
