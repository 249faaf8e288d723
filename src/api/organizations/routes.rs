// Organization route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations",
            get(handler::list_organizations).post(handler::create_organization),
        )
        .route(
            "/organizations/{id}",
            get(handler::get_organization)
                .put(handler::update_organization)
                .delete(handler::delete_organization),
        )
}
