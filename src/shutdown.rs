use tokio_util::sync::CancellationToken;

/// Cancel the returned token on SIGINT or, on Unix, SIGTERM.
///
/// The HTTP server drains and the dispatcher lets the current playback
/// finish before exiting.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => tracing::info!("Received SIGINT, shutting down"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for SIGINT, shutting down"),
            },
            _ = terminate() => tracing::info!("Received SIGTERM, shutting down"),
        }
        trigger.cancel();
    });

    token
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
