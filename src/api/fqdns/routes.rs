// FQDN route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn fqdn_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/fqdns",
            get(handler::list_fqdns).post(handler::create_fqdn).put(handler::create_fqdn),
        )
        // * `{fqdn}` is the id, or the name for lookups
        .route(
            "/fqdns/{fqdn}",
            get(handler::get_fqdn).put(handler::update_fqdn).delete(handler::delete_fqdn),
        )
}
