// Files published under a deliverable, optionally reserved for SLA constituents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::models::{constraint_error, row_count, Serializable};
use crate::pagination::PageRequest;
use crate::utils::error_handler::{ApiError, ApiResult};

const SELECT: &str = "SELECT f.id, f.deliverable_id, f.name, f.is_sla, f.created, d.name AS type_name \
     FROM deliverable_files f LEFT JOIN deliverables d ON d.id = f.deliverable_id";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DeliverableFile {
    pub id: i32,
    pub deliverable_id: i32,
    pub name: String,
    /// Only SLA constituents may see the file
    pub is_sla: bool,
    pub created: DateTime<Utc>,
    /// Name of the deliverable the file belongs to
    pub type_name: Option<String>,
}

impl Serializable for DeliverableFile {
    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "created": self.created,
            "type": self.type_name,
        })
    }
}

/// Body of `POST /files`: names of already uploaded files to register
#[derive(Debug, Clone, Deserialize)]
pub struct NewDeliverableFiles {
    pub deliverable_id: i32,
    #[serde(default, deserialize_with = "flag")]
    pub is_sla: bool,
    pub files: Vec<String>,
}

/// Accepts `true`/`false` as well as `1`/`0`
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        None => false,
    })
}

impl NewDeliverableFiles {
    /// Trimmed file names; paths are refused
    pub fn validated_names(&self) -> ApiResult<Vec<&str>> {
        if self.files.is_empty() {
            return Err(ApiError::BadRequest("files cannot be empty".to_string()));
        }

        self.files
            .iter()
            .map(|name| {
                let name: &str = name.trim();
                if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
                    return Err(ApiError::BadRequest(format!("'{name}' is not a valid file name")));
                }
                Ok(name)
            })
            .collect()
    }
}

impl DeliverableFile {
    /// Newest files first. Without `include_sla` the SLA-only files are left out.
    pub async fn page(
        pool: &PgPool,
        request: PageRequest,
        include_sla: bool,
    ) -> sqlx::Result<(u64, Vec<DeliverableFile>)> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM deliverable_files WHERE deleted = 0 AND ($1 OR NOT is_sla)",
        )
        .bind(include_sla)
        .fetch_one(pool)
        .await?;

        let files: Vec<DeliverableFile> = sqlx::query_as(&format!(
            "{SELECT} WHERE f.deleted = 0 AND ($1 OR NOT f.is_sla) ORDER BY f.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(include_sla)
        .bind(request.sql_limit())
        .bind(request.sql_offset())
        .fetch_all(pool)
        .await?;

        Ok((row_count(count), files))
    }

    pub async fn find(pool: &PgPool, id: i32) -> ApiResult<DeliverableFile> {
        sqlx::query_as(&format!("{SELECT} WHERE f.id = $1 AND f.deleted = 0"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Registers every name under one deliverable; either all rows are added or none
    pub async fn create_many(
        pool: &PgPool,
        deliverable_id: i32,
        is_sla: bool,
        names: &[&str],
    ) -> ApiResult<Vec<i32>> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let mut ids: Vec<i32> = Vec::with_capacity(names.len());

        for name in names {
            let id: i32 = sqlx::query_scalar(
                "INSERT INTO deliverable_files (deliverable_id, name, is_sla) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(deliverable_id)
            .bind(*name)
            .bind(is_sla)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    /// The file itself stays on disk
    pub async fn soft_delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let updated: u64 = sqlx::query("UPDATE deliverable_files SET deleted = 1 WHERE id = $1 AND deleted = 0")
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

fn write_error(err: sqlx::Error) -> ApiError {
    constraint_error(
        err,
        "File already registered",
        "deliverable_id does not reference an existing deliverable",
    )
}
