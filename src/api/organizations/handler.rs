// Organization handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::models::{Organization, OrganizationPayload, Serializable};
use crate::pagination::{Page, PageLinks, PageParams, PageRequest, PagedResponse, Pagination};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

#[instrument(name = "list_organizations", skip(state, links))]
pub async fn list_organizations(
    State(state): State<AppState>,
    params: PageParams,
    links: PageLinks,
) -> ApiResult<PagedResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let pagination: Pagination = state.do_pagination();
    let request: PageRequest = pagination.request(&params);

    let (count, organizations) = Organization::page(pool, request).await?;

    Ok(PagedResponse::new(Page::new(request, count, &organizations, &links), &pagination))
}

#[instrument(name = "get_organization", skip(state))]
pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let organization: Organization = Organization::find(state.database.get_pool()?, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(organization.to_value()))
}

#[instrument(name = "create_organization", skip(state))]
pub async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<OrganizationPayload>,
) -> ApiResult<HandlerResponse> {
    payload.validate_new()?;
    let organization: Organization = Organization::create(state.database.get_pool()?, &payload).await?;
    info!("Created organization {}", organization.id);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(organization.to_value())
        .message("Organization added"))
}

#[instrument(name = "update_organization", skip(state))]
pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrganizationPayload>,
) -> ApiResult<HandlerResponse> {
    payload.validate_update()?;
    let organization: Organization = Organization::update(state.database.get_pool()?, id, &payload).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(organization.to_value())
        .message("Organization saved"))
}

#[instrument(name = "delete_organization", skip(state))]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    Organization::soft_delete(state.database.get_pool()?, id).await?;
    info!("Organization {} marked deleted", id);

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("Organization deleted"))
}
