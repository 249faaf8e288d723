// Which organizations and users a portal caller may manage: its own
// organization and everything below it in the organization tree

use sqlx::PgPool;

use crate::api::middleware::Customer;
use crate::models::{Organization, User};
use crate::utils::error_handler::{ApiError, ApiResult};

/// 404 when the organization does not exist, 403 when it is outside the caller's tree
pub async fn managed_organization(pool: &PgPool, customer: &Customer, id: i32) -> ApiResult<Organization> {
    let organization: Organization = Organization::find(pool, id).await?;

    if !Organization::is_within(pool, customer.organization_id, id).await? {
        return Err(ApiError::Forbidden(format!("Organization {id} is not managed by the caller")));
    }
    Ok(organization)
}

/// 404 when the user does not exist, 403 when it has no membership in the caller's tree
pub async fn managed_user(pool: &PgPool, customer: &Customer, id: i32) -> ApiResult<User> {
    let user: User = User::find(pool, id).await?;

    if !User::is_managed_by(pool, id, customer.organization_id).await? {
        return Err(ApiError::Forbidden(format!("User {id} is not managed by the caller")));
    }
    Ok(user)
}
