use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use caredesk::api;
use caredesk::config;
use caredesk::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let state = match AppState::open() {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to open stores: {e}");
            std::process::exit(1);
        }
    };

    if state.admin.is_none() {
        tracing::warn!("ADMIN_EMAIL / ADMIN_PASSWORD unset, admin login disabled");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config::port()));
    let mut server = match api::start_api_server(state, addr).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    // Let in-flight requests drain before the process exits
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
}
