// Vulnerability handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::models::{Serializable, Vulnerability, VulnerabilityPayload};
use crate::pagination::{Page, PageLinks, PageParams, PageRequest, PagedResponse, Pagination};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

/// Lists vulnerabilities across every constituent, newest first
#[instrument(name = "list_vulnerabilities", skip(state, links))]
pub async fn list_vulnerabilities(
    State(state): State<AppState>,
    params: PageParams,
    links: PageLinks,
) -> ApiResult<PagedResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let pagination: Pagination = state.do_pagination();
    let request: PageRequest = pagination.request(&params);

    let (count, vulnerabilities) = Vulnerability::page(pool, request, None).await?;

    Ok(PagedResponse::new(Page::new(request, count, &vulnerabilities, &links), &pagination))
}

#[instrument(name = "get_vulnerability", skip(state))]
pub async fn get_vulnerability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let vulnerability: Vulnerability = Vulnerability::find(state.database.get_pool()?, id, None).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(vulnerability.to_value()))
}

#[instrument(name = "create_vulnerability", skip(state))]
pub async fn create_vulnerability(
    State(state): State<AppState>,
    Json(payload): Json<VulnerabilityPayload>,
) -> ApiResult<HandlerResponse> {
    payload.validate_new()?;
    let vulnerability: Vulnerability = Vulnerability::create(state.database.get_pool()?, &payload).await?;
    info!("Vulnerability {} reported", vulnerability.id);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(vulnerability.to_value())
        .message("Vulnerability added"))
}

#[instrument(name = "update_vulnerability", skip(state))]
pub async fn update_vulnerability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<VulnerabilityPayload>,
) -> ApiResult<HandlerResponse> {
    payload.validate_update()?;
    let vulnerability: Vulnerability =
        Vulnerability::update(state.database.get_pool()?, id, &payload).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(vulnerability.to_value())
        .message("Vulnerability saved"))
}

#[instrument(name = "delete_vulnerability", skip(state))]
pub async fn delete_vulnerability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    Vulnerability::soft_delete(state.database.get_pool()?, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("Vulnerability deleted"))
}
