// FQDN handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::models::fqdn::FqdnKey;
use crate::models::{Fqdn, FqdnPayload, Serializable};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

#[instrument(name = "list_fqdns", skip(state))]
pub async fn list_fqdns(State(state): State<AppState>) -> ApiResult<HandlerResponse> {
    let fqdns: Vec<Fqdn> = Fqdn::all(state.database.get_pool()?).await?;
    let items: Vec<Value> = fqdns.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "fqdns": items })))
}

#[instrument(name = "get_fqdn", skip(state))]
pub async fn get_fqdn(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<HandlerResponse> {
    let fqdn: Fqdn = Fqdn::find(state.database.get_pool()?, &FqdnKey::parse(&key), None).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(fqdn.to_value()))
}

#[instrument(name = "create_fqdn", skip(state))]
pub async fn create_fqdn(
    State(state): State<AppState>,
    Json(payload): Json<FqdnPayload>,
) -> ApiResult<HandlerResponse> {
    let (organization_id, name) = payload.validate_new()?;
    let fqdn: Fqdn = Fqdn::create(state.database.get_pool()?, organization_id, &name).await?;
    info!("Registered FQDN {} for organization {}", fqdn.fqdn, organization_id);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(fqdn.to_value())
        .message("FQDN added"))
}

/// Renames the FQDN and/or hands it to another organization
#[instrument(name = "update_fqdn", skip(state))]
pub async fn update_fqdn(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FqdnPayload>,
) -> ApiResult<HandlerResponse> {
    let name: Option<String> = payload.validate_update()?;
    let fqdn: Fqdn = Fqdn::update(
        state.database.get_pool()?,
        id,
        None,
        name.as_deref(),
        payload.organization_id,
    )
    .await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(fqdn.to_value())
        .message("FQDN saved"))
}

#[instrument(name = "delete_fqdn", skip(state))]
pub async fn delete_fqdn(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    Fqdn::soft_delete(state.database.get_pool()?, id, None).await?;
    info!("FQDN {} marked deleted", id);

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("FQDN deleted"))
}
