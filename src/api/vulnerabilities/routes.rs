// Vulnerability route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn vulnerability_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vulnerabilities",
            get(handler::list_vulnerabilities).post(handler::create_vulnerability),
        )
        .route(
            "/vulnerabilities/{id}",
            get(handler::get_vulnerability)
                .put(handler::update_vulnerability)
                .delete(handler::delete_vulnerability),
        )
}
