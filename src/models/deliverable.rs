// Deliverable types published to constituents: CIMBL, CITAR and the like

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};

use crate::models::Serializable;
use crate::utils::error_handler::{ApiError, ApiResult};

pub const MAX_DELIVERABLE_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Deliverable {
    pub id: i32,
    pub name: String,
}

impl Serializable for Deliverable {
    fn to_value(&self) -> Value {
        json!({ "id": self.id, "name": self.name })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliverablePayload {
    pub name: String,
}

impl DeliverablePayload {
    pub fn validated_name(&self) -> ApiResult<&str> {
        let name: &str = self.name.trim();

        if name.is_empty() {
            return Err(ApiError::BadRequest("name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_DELIVERABLE_NAME_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "name cannot exceed {MAX_DELIVERABLE_NAME_LENGTH} characters"
            )));
        }

        Ok(name)
    }
}

impl Deliverable {
    pub async fn all(pool: &PgPool) -> sqlx::Result<Vec<Deliverable>> {
        sqlx::query_as("SELECT id, name FROM deliverables WHERE deleted = 0 ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn find(pool: &PgPool, id: i32) -> ApiResult<Deliverable> {
        sqlx::query_as("SELECT id, name FROM deliverables WHERE id = $1 AND deleted = 0")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn create(pool: &PgPool, name: &str) -> ApiResult<Deliverable> {
        let deliverable: Deliverable =
            sqlx::query_as("INSERT INTO deliverables (name) VALUES ($1) RETURNING id, name")
                .bind(name)
                .fetch_one(pool)
                .await?;

        Ok(deliverable)
    }

    pub async fn rename(pool: &PgPool, id: i32, name: &str) -> ApiResult<Deliverable> {
        sqlx::query_as("UPDATE deliverables SET name = $2 WHERE id = $1 AND deleted = 0 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Files already published under the deliverable stay listed
    pub async fn soft_delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let updated: u64 = sqlx::query("UPDATE deliverables SET deleted = 1 WHERE id = $1 AND deleted = 0")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}
