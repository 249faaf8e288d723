// Deliverable handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::models::{Deliverable, DeliverablePayload, Serializable};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

/// The whole list; there are only a handful of deliverable types
#[instrument(name = "list_deliverables", skip(state))]
pub async fn list_deliverables(State(state): State<AppState>) -> ApiResult<HandlerResponse> {
    let deliverables: Vec<Deliverable> = Deliverable::all(state.database.get_pool()?).await?;
    let items: Vec<Value> = deliverables.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "deliverables": items })))
}

#[instrument(name = "get_deliverable", skip(state))]
pub async fn get_deliverable(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let deliverable: Deliverable = Deliverable::find(state.database.get_pool()?, id).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(deliverable.to_value()))
}

#[instrument(name = "create_deliverable", skip(state))]
pub async fn create_deliverable(
    State(state): State<AppState>,
    Json(payload): Json<DeliverablePayload>,
) -> ApiResult<HandlerResponse> {
    let name: &str = payload.validated_name()?;
    let deliverable: Deliverable = Deliverable::create(state.database.get_pool()?, name).await?;
    info!("Created deliverable {} ({})", deliverable.id, deliverable.name);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(deliverable.to_value())
        .message("Deliverable added"))
}

#[instrument(name = "update_deliverable", skip(state))]
pub async fn update_deliverable(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<DeliverablePayload>,
) -> ApiResult<HandlerResponse> {
    let name: &str = payload.validated_name()?;
    let deliverable: Deliverable = Deliverable::rename(state.database.get_pool()?, id, name).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(deliverable.to_value())
        .message("Deliverable saved"))
}

#[instrument(name = "delete_deliverable", skip(state))]
pub async fn delete_deliverable(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    Deliverable::soft_delete(state.database.get_pool()?, id).await?;
    info!("Deliverable {} marked deleted", id);

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("Deliverable deleted"))
}
