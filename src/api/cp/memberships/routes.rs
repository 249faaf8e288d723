// Membership route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn membership_routes() -> Router<AppState> {
    Router::new()
        .route("/membership_roles", get(handler::list_roles))
        .route(
            "/organization_memberships",
            get(handler::list_memberships).post(handler::add_membership),
        )
        .route(
            "/organization_memberships/{id}",
            get(handler::get_membership)
                .put(handler::update_membership)
                .delete(handler::delete_membership),
        )
}
