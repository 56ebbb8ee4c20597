use std::error::Error;

use chatbrewery::{app, initialize_state, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    telemetry::setup_tracing();

    if let Err(err) = run().await {
        // A server without its database is unusable.
        tracing::error!(error = %err, "cannot run server");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let state = initialize_state().await?;
    let addr = state.config.socket_addr()?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        name = %state.config.name,
        version = state.config.version(),
        "server started"
    );

    let served = axum::serve(listener, app(state.clone()).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.db.close().await;
    Ok(served?)
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("gracefully shutting down");
}
