//! tests/mod.rs
//! Shared helper spawning the full router on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use axum::{serve, Router};
use tokio::net::TcpListener as TokioTcpListener;

use do_portal::config::{environment::EnvironmentVariables, state::AppState};
use do_portal::core::server::create_app;

/// Spawns the app with default configuration and returns its base URL.
/// The database pool is never initialized, so only routes that do not touch
/// it answer successfully.
pub fn spawn_app() -> String {
    spawn_app_with(EnvironmentVariables::default())
}

/// Spawns the app with the given configuration and returns its base URL.
pub fn spawn_app_with(env: EnvironmentVariables) -> String {
    let app: Router = create_app(AppState::new(env));
    spawn_router(app)
}

/// Serves any router with client addresses available to extractors.
pub fn spawn_router(app: Router) -> String {
    // * Bind an ephemeral port using std::net::TcpListener.
    let std_listener: std::net::TcpListener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    std_listener.set_nonblocking(true).unwrap();

    let tokio_listener: TokioTcpListener = TokioTcpListener::from_std(std_listener)
        .expect("Failed to convert to tokio listener");

    let addr: SocketAddr = tokio_listener.local_addr().unwrap();

    // * Spawn the server in a background task.
    tokio::spawn(async move {
        serve(tokio_listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .expect("Server failed");
    });

    format!("http://{}", addr)
}
