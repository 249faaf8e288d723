// Landing route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn index_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::index))
        .route("/teapot", get(handler::teapot))
}
