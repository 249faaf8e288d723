// Portal file route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn file_routes() -> Router<AppState> {
    Router::new().route("/files", get(handler::list_files))
}
