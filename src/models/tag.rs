// Tags attached to deliverables and reports

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};

use crate::models::{constraint_error, row_count, Serializable};
use crate::pagination::PageRequest;
use crate::utils::error_handler::{ApiError, ApiResult};

pub const MAX_TAG_NAME_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

impl Serializable for Tag {
    fn to_value(&self) -> Value {
        json!({ "id": self.id, "name": self.name })
    }
}

/// Body of `POST /tags` and `PUT /tags/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TagPayload {
    pub name: String,
}

impl TagPayload {
    /// Trimmed tag name, rejected when empty or too long
    pub fn validated_name(&self) -> ApiResult<&str> {
        let name: &str = self.name.trim();

        if name.is_empty() {
            return Err(ApiError::BadRequest("name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_TAG_NAME_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "name cannot exceed {MAX_TAG_NAME_LENGTH} characters"
            )));
        }

        Ok(name)
    }
}

impl Tag {
    /// One page of tags ordered by name, with the total count
    pub async fn page(pool: &PgPool, request: PageRequest) -> sqlx::Result<(u64, Vec<Tag>)> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
            .fetch_one(pool)
            .await?;

        let tags: Vec<Tag> = sqlx::query_as("SELECT id, name FROM tags ORDER BY name, id LIMIT $1 OFFSET $2")
            .bind(request.sql_limit())
            .bind(request.sql_offset())
            .fetch_all(pool)
            .await?;

        Ok((row_count(count), tags))
    }

    pub async fn find(pool: &PgPool, id: i32) -> ApiResult<Tag> {
        sqlx::query_as("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn create(pool: &PgPool, name: &str) -> ApiResult<Tag> {
        sqlx::query_as("INSERT INTO tags (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(pool)
            .await
            .map_err(|e| duplicate_name(e, name))
    }

    pub async fn rename(pool: &PgPool, id: i32, name: &str) -> ApiResult<Tag> {
        sqlx::query_as("UPDATE tags SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|e| duplicate_name(e, name))?
            .ok_or(ApiError::NotFound)
    }

    pub async fn delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let deleted: u64 = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

fn duplicate_name(err: sqlx::Error, name: &str) -> ApiError {
    constraint_error(err, &format!("Tag '{name}' already exists"), "Invalid tag reference")
}
