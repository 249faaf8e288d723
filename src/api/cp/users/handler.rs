// Portal user handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::api::cp::access::{managed_organization, managed_user};
use crate::api::middleware::Customer;
use crate::config::state::AppState;
use crate::models::user::hash_password;
use crate::models::{NewUser, Serializable, User, UserPayload};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

#[instrument(name = "cp_list_users", skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    customer: Customer,
) -> ApiResult<HandlerResponse> {
    let users: Vec<User> = User::in_tree(state.database.get_pool()?, customer.organization_id).await?;
    let items: Vec<Value> = users.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "users": items })))
}

#[instrument(name = "cp_get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let user: User = managed_user(state.database.get_pool()?, &customer, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(user.to_value()))
}

/// Creates the user together with its membership in one of the caller's organizations
#[instrument(name = "cp_add_user", skip(state, payload))]
pub async fn add_user(
    State(state): State<AppState>,
    customer: Customer,
    Json(payload): Json<NewUser>,
) -> ApiResult<HandlerResponse> {
    let (name, email) = payload.validate()?;
    let pool: &PgPool = state.database.get_pool()?;
    managed_organization(pool, &customer, payload.organization_id).await?;

    let password_hash: Option<String> = match payload.password {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    let user: User = User::create_with_membership(
        pool,
        &name,
        &email,
        password_hash.as_deref(),
        payload.organization_id,
        payload.membership_role_id,
    )
    .await?;
    info!("Organization {} added user {}", payload.organization_id, user.id);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(user.to_value())
        .message("User added"))
}

#[instrument(name = "cp_update_user", skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<HandlerResponse> {
    let (name, email) = payload.validate()?;
    let pool: &PgPool = state.database.get_pool()?;
    managed_user(pool, &customer, id).await?;

    let password_hash: Option<String> = match payload.password {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    let user: User = User::update(pool, id, name.as_deref(), email.as_deref(), password_hash.as_deref()).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(user.to_value())
        .message("User saved"))
}

/// Also ends every membership the user holds
#[instrument(name = "cp_delete_user", skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    managed_user(pool, &customer, id).await?;
    User::soft_delete(pool, id).await?;
    info!("Deleted user {}", id);

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("User deleted"))
}
