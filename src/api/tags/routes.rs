// Tag route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

/// Creates router with all tag endpoints
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handler::list_tags).post(handler::create_tag))
        .route(
            "/tags/{id}",
            get(handler::get_tag).put(handler::update_tag).delete(handler::delete_tag),
        )
}
