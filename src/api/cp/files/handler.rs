// Portal file handlers

use axum::extract::State;
use sqlx::PgPool;
use tracing::instrument;

use crate::api::middleware::Customer;
use crate::config::state::AppState;
use crate::models::{DeliverableFile, Organization};
use crate::pagination::{Page, PageLinks, PageParams, PageRequest, PagedResponse, Pagination};
use crate::utils::error_handler::{ApiError, ApiResult};

/// Whether the caller's organization has a service level agreement.
/// An unknown organization sees the public files only.
async fn has_sla(pool: &PgPool, customer: &Customer) -> ApiResult<bool> {
    match Organization::find(pool, customer.organization_id).await {
        Ok(organization) => Ok(organization.is_sla),
        Err(ApiError::NotFound) => Ok(false),
        Err(err) => Err(err),
    }
}

#[instrument(name = "cp_list_files", skip(state, links))]
pub async fn list_files(
    State(state): State<AppState>,
    customer: Customer,
    params: PageParams,
    links: PageLinks,
) -> ApiResult<PagedResponse> {
    let pool: &PgPool = state.database.get_pool()?;
    let pagination: Pagination = state.cp_pagination();
    let request: PageRequest = pagination.request(&params);

    let include_sla: bool = has_sla(pool, &customer).await?;
    let (count, files) = DeliverableFile::page(pool, request, include_sla).await?;

    Ok(PagedResponse::new(Page::new(request, count, &files, &links), &pagination))
}
