// Deliverable file route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handler::list_files).post(handler::add_files).put(handler::add_files),
        )
        .route("/files/{id}", get(handler::get_file).delete(handler::delete_file))
}
