// Deliverable file handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::models::{DeliverableFile, NewDeliverableFiles, Serializable};
use crate::pagination::{Page, PageLinks, PageParams, PageRequest, PagedResponse, Pagination};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

/// Every file, SLA-only ones included, newest first
#[instrument(name = "list_files", skip(state, links))]
pub async fn list_files(
    State(state): State<AppState>,
    params: PageParams,
    links: PageLinks,
) -> ApiResult<PagedResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let pagination: Pagination = state.do_pagination();
    let request: PageRequest = pagination.request(&params);

    let (count, files) = DeliverableFile::page(pool, request, true).await?;

    Ok(PagedResponse::new(Page::new(request, count, &files, &links), &pagination))
}

#[instrument(name = "get_file", skip(state))]
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let file: DeliverableFile = DeliverableFile::find(state.database.get_pool()?, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(file.to_value()))
}

/// Registers files that were already uploaded, all under one deliverable
#[instrument(name = "add_files", skip(state))]
pub async fn add_files(
    State(state): State<AppState>,
    Json(payload): Json<NewDeliverableFiles>,
) -> ApiResult<HandlerResponse> {
    let names: Vec<&str> = payload.validated_names()?;
    let ids: Vec<i32> = DeliverableFile::create_many(
        state.database.get_pool()?,
        payload.deliverable_id,
        payload.is_sla,
        &names,
    )
    .await?;
    info!("Registered {} file(s) for deliverable {}", ids.len(), payload.deliverable_id);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(json!({ "files": names, "ids": ids }))
        .message("Files added"))
}

#[instrument(name = "delete_file", skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    DeliverableFile::soft_delete(state.database.get_pool()?, id).await?;
    info!("File {} marked deleted", id);

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("File deleted"))
}
