// Deliverable route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn deliverable_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/deliverables",
            get(handler::list_deliverables)
                .post(handler::create_deliverable)
                .put(handler::create_deliverable),
        )
        .route(
            "/deliverables/{id}",
            get(handler::get_deliverable)
                .put(handler::update_deliverable)
                .delete(handler::delete_deliverable),
        )
}
