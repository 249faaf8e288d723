// Tag handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::models::{Serializable, Tag, TagPayload};
use crate::pagination::{Page, PageLinks, PageParams, PageRequest, PagedResponse, Pagination};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

#[instrument(name = "list_tags", skip(state, links))]
pub async fn list_tags(
    State(state): State<AppState>,
    params: PageParams,
    links: PageLinks,
) -> ApiResult<PagedResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let pagination: Pagination = state.do_pagination();
    let request: PageRequest = pagination.request(&params);

    let (count, tags) = Tag::page(pool, request).await?;

    Ok(PagedResponse::new(Page::new(request, count, &tags, &links), &pagination))
}

#[instrument(name = "get_tag", skip(state))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let tag: Tag = Tag::find(state.database.get_pool()?, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(tag.to_value()))
}

#[instrument(name = "create_tag", skip(state))]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<TagPayload>,
) -> ApiResult<HandlerResponse> {
    let name: &str = payload.validated_name()?;
    let tag: Tag = Tag::create(state.database.get_pool()?, name).await?;
    info!("Created tag {} ({})", tag.id, tag.name);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(tag.to_value())
        .message("Tag added"))
}

#[instrument(name = "update_tag", skip(state))]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TagPayload>,
) -> ApiResult<HandlerResponse> {
    let name: &str = payload.validated_name()?;
    let tag: Tag = Tag::rename(state.database.get_pool()?, id, name).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(tag.to_value())
        .message("Tag saved"))
}

#[instrument(name = "delete_tag", skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    Tag::delete(state.database.get_pool()?, id).await?;
    info!("Deleted tag {}", id);

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("Tag deleted"))
}
