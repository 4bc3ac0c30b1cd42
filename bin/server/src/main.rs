use cawi_portal_core::Result;
use cawi_portal_lookup::UacLookupClient;
use cawi_portal_server::{app, auth::AppState, config::ServerConfig, error::StartupError};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("{report}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!(uac_kind = %config.uac_kind, dev_mode = config.dev_mode, "Loaded configuration");

    let lookup = UacLookupClient::new(&config.lookup).map_err(|e| StartupError::Lookup {
        details: e.to_string(),
    })?;

    let state = AppState::from_config(&config, Arc::new(lookup));
    let app = app::router(state, config.dev_mode);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.listen_addr.to_string(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| StartupError::Serve {
        details: e.to_string(),
    })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
