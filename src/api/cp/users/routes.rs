// Portal user route definitions

use axum::{routing::get, Router};

use crate::config::state::AppState;
use super::handler;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handler::list_users).post(handler::add_user))
        .route(
            "/users/{id}",
            get(handler::get_user).put(handler::update_user).delete(handler::delete_user),
        )
}
