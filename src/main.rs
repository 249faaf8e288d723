// Start of file: src/main.rs

use std::net::SocketAddr;
use axum::{serve, Router};
use tokio::net::TcpListener;
use tracing::info;

use do_portal::config::state::AppState;
use do_portal::core::{logging::init_tracing, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let state: AppState = AppState::from_env()?;
    state.init_database().await?;

    let app: Router = server::create_app(state.clone());
    let listener: TcpListener = server::setup_listener(&state.environment).await?;

    info!(
        "Server listening on: {}://{}",
        state.environment.protocol,
        listener.local_addr()?
    );

    serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(server::shutdown_signal(state))
        .await?;

    Ok(())
}

// End of file: src/main.rs
