// Customer portal handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::api::middleware::Customer;
use crate::config::state::AppState;
use crate::models::fqdn::FqdnKey;
use crate::models::{Fqdn, NewFqdn, Organization, Serializable, Vulnerability};
use crate::pagination::{Page, PageLinks, PageParams, PageRequest, PagedResponse, Pagination};
use crate::utils::error_handler::ApiResult;
use crate::utils::response_handler::HandlerResponse;

/// The caller's organization followed by its children
#[instrument(name = "cp_list_organizations", skip(state))]
pub async fn list_organizations(
    State(state): State<AppState>,
    customer: Customer,
) -> ApiResult<HandlerResponse> {
    let organizations: Vec<Organization> =
        Organization::with_children(state.database.get_pool()?, customer.organization_id).await?;
    let items: Vec<Value> = organizations.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "organizations": items })))
}

#[instrument(name = "cp_list_vulnerabilities", skip(state, links))]
pub async fn list_vulnerabilities(
    State(state): State<AppState>,
    customer: Customer,
    params: PageParams,
    links: PageLinks,
) -> ApiResult<PagedResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let pagination: Pagination = state.cp_pagination();
    let request: PageRequest = pagination.request(&params);

    let (count, vulnerabilities) =
        Vulnerability::page(pool, request, Some(customer.organization_id)).await?;

    Ok(PagedResponse::new(Page::new(request, count, &vulnerabilities, &links), &pagination))
}

/// Vulnerabilities of other organizations answer 404
#[instrument(name = "cp_get_vulnerability", skip(state))]
pub async fn get_vulnerability(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    let vulnerability: Vulnerability =
        Vulnerability::find(state.database.get_pool()?, id, Some(customer.organization_id)).await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(vulnerability.to_value()))
}

#[instrument(name = "cp_list_fqdns", skip(state))]
pub async fn list_fqdns(
    State(state): State<AppState>,
    customer: Customer,
) -> ApiResult<HandlerResponse> {
    let fqdns: Vec<Fqdn> = Fqdn::for_organization(state.database.get_pool()?, customer.organization_id).await?;
    let items: Vec<Value> = fqdns.iter().map(Serializable::to_value).collect();

    Ok(HandlerResponse::new(StatusCode::OK).data(json!({ "fqdns": items })))
}

/// `key` is the numeric id or the name itself
#[instrument(name = "cp_get_fqdn", skip(state))]
pub async fn get_fqdn(
    State(state): State<AppState>,
    customer: Customer,
    Path(key): Path<String>,
) -> ApiResult<HandlerResponse> {
    let fqdn: Fqdn = Fqdn::find(
        state.database.get_pool()?,
        &FqdnKey::parse(&key),
        Some(customer.organization_id),
    )
    .await?;

    Ok(HandlerResponse::new(StatusCode::OK).data(fqdn.to_value()))
}

#[instrument(name = "cp_add_fqdn", skip(state))]
pub async fn add_fqdn(
    State(state): State<AppState>,
    customer: Customer,
    Json(payload): Json<NewFqdn>,
) -> ApiResult<HandlerResponse> {
    let name: String = payload.normalized()?;
    let fqdn: Fqdn = Fqdn::create(state.database.get_pool()?, customer.organization_id, &name).await?;
    info!("Organization {} added FQDN {}", customer.organization_id, fqdn.fqdn);

    Ok(HandlerResponse::new(StatusCode::CREATED)
        .data(fqdn.to_value())
        .message("FQDN added"))
}

#[instrument(name = "cp_update_fqdn", skip(state))]
pub async fn update_fqdn(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
    Json(payload): Json<NewFqdn>,
) -> ApiResult<HandlerResponse> {
    let name: String = payload.normalized()?;
    let fqdn: Fqdn = Fqdn::update(
        state.database.get_pool()?,
        id,
        Some(customer.organization_id),
        Some(&name),
        None,
    )
    .await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(fqdn.to_value())
        .message("FQDN saved"))
}

#[instrument(name = "cp_delete_fqdn", skip(state))]
pub async fn delete_fqdn(
    State(state): State<AppState>,
    customer: Customer,
    Path(id): Path<i32>,
) -> ApiResult<HandlerResponse> {
    Fqdn::soft_delete(state.database.get_pool()?, id, Some(customer.organization_id)).await?;

    Ok(HandlerResponse::new(StatusCode::OK)
        .data(json!({ "id": id }))
        .message("FQDN deleted"))
}
