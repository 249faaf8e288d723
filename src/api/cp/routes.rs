// Customer portal route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::{files, handler, memberships, users};

pub fn cp_resource_routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", get(handler::list_organizations))
        .route("/vulnerabilities", get(handler::list_vulnerabilities))
        .route("/vulnerabilities/{id}", get(handler::get_vulnerability))
        .route(
            "/fqdns",
            get(handler::list_fqdns).post(handler::add_fqdn).put(handler::add_fqdn),
        )
        // * One segment serves both the id and the name lookup
        .route(
            "/fqdns/{fqdn}",
            get(handler::get_fqdn).put(handler::update_fqdn).delete(handler::delete_fqdn),
        )
        .merge(files::file_routes())
        .merge(users::user_routes())
        .merge(memberships::membership_routes())
}
