use std::future::Future;

use anyhow::{Context, anyhow};
use common::config::ServerSettings;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::App;

/// Resolves `host` (names included) and binds. Runs before the terminal is
/// connected, so a bad address never leaves a live session behind.
pub async fn bind(settings: &ServerSettings) -> anyhow::Result<TcpListener> {
    let addr = settings.bind_address();
    TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AddrInUse => {
                anyhow!("Failed to bind to {}: address already in use", addr)
            }
            std::io::ErrorKind::PermissionDenied => anyhow!(
                "Failed to bind to {}: permission denied, use a port above 1024",
                addr
            ),
            _ => anyhow!("Failed to bind to {}: {}", addr, e),
        })
}

/// Serves until Ctrl-C or SIGTERM, then closes the terminal session.
pub async fn run(listener: TcpListener, app: App) -> anyhow::Result<()> {
    run_until(listener, app, shutdown_signal()).await
}

async fn run_until<F>(listener: TcpListener, app: App, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match listener.local_addr() {
        Ok(addr) => info!("Listening on http://{}", addr),
        Err(e) => warn!("Listening on an unknown address: {}", e),
    }

    let served = axum::serve(listener, app.router)
        .with_graceful_shutdown(shutdown)
        .await;

    app.session.shutdown().await;
    served.context("Server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Received shutdown signal, stopping server...");
}
