// Membership handlers

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
use crate::models::{MembershipPayload, MembershipRole, OrganizationMembership, Serializable};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

/// Both ends of a membership must be managed by the caller
async fn check_access(pool: &PgPool, customer: &Customer, organization_id: i32, user_id: i32) -> ApiResult<()> {
    managed_organization(pool, customer, organization_id).await?;
    managed_user(pool, customer, user_id).await?;
    Ok(())
}

#[instrument(name = "cp_list_membership_roles", skip(state))]
pub async fn list_roles(
    State(state): State<AppState>,
    _customer: Customer,
) -> ApiResult<HandlerResponse> {
    let roles: Vec<MembershipRole> = MembershipRole::all(state.database.get_pool()?).await?;
    let items: Vec<Value> = roles.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "membership_roles": items })))
}

#[instrument(name = "cp_list_memberships", skip(state))]
pub async fn list_memberships(
    State(state): State<AppState>,
    customer: Customer,
) -> ApiResult<HandlerResponse> {
    let memberships: Vec<OrganizationMembership> =
        OrganizationMembership::in_tree(state.database.get_pool()?, customer.organization_id).await?;
    let items: Vec<Value> = memberships.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "organization_memberships": items })))
}

#[instrument(name = "cp_get_membership", skip(state))]
pub async fn get_membership(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let membership: OrganizationMembership = OrganizationMembership::find(pool, id).await?;
    check_access(pool, &customer, membership.organization_id, membership.user_id).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(membership.to_value()))
}

#[instrument(name = "cp_add_membership", skip(state))]
pub async fn add_membership(
    State(state): State<AppState>,
    customer: Customer,
    Json(payload): Json<MembershipPayload>,
) -> ApiResult<HandlerResponse> {
    let payload: MembershipPayload = payload.validate_new()?;
    let pool: &PgPool = state.database.get_pool()?;
    check_access(
        pool,
        &customer,
        payload.organization_id.unwrap_or_default(),
        payload.user_id.unwrap_or_default(),
    )
    .await?;

    let membership: OrganizationMembership = OrganizationMembership::create(pool, &payload).await?;
    info!(
        "Organization {} added membership {} for user {}",
        membership.organization_id, membership.id, membership.user_id
    );

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(membership.to_value())
        .message("Organization membership added"))
}

/// Moving a membership to another user or organization needs access to both sides
#[instrument(name = "cp_update_membership", skip(state))]
pub async fn update_membership(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
    Json(payload): Json<MembershipPayload>,
) -> ApiResult<HandlerResponse> {
    let payload: MembershipPayload = payload.validate_update()?;
    let pool: &PgPool = state.database.get_pool()?;

    let current: OrganizationMembership = OrganizationMembership::find(pool, id).await?;
    check_access(pool, &customer, current.organization_id, current.user_id).await?;
    check_access(
        pool,
        &customer,
        payload.organization_id.unwrap_or(current.organization_id),
        payload.user_id.unwrap_or(current.user_id),
    )
    .await?;

    let membership: OrganizationMembership = OrganizationMembership::update(pool, id, &payload).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(membership.to_value())
        .message("Organization membership saved"))
}

#[instrument(name = "cp_delete_membership", skip(state))]
pub async fn delete_membership(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let membership: OrganizationMembership = OrganizationMembership::find(pool, id).await?;
    check_access(pool, &customer, membership.organization_id, membership.user_id).await?;

    OrganizationMembership::soft_delete(pool, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("Organization membership deleted"))
}
