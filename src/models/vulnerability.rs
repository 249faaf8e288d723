// Vulnerabilities reported against constituent web assets

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};

use crate::models::{constraint_error, row_count, Serializable};
use crate::pagination::PageRequest;
use crate::utils::error_handler::{ApiError, ApiResult};

pub const REQUEST_METHODS: [&str; 3] = ["GET", "POST", "PUT"];

const SELECT: &str = "SELECT v.id, v.organization_id, o.abbreviation AS constituent, v.incident_id, \
     v.reporter_name, v.reporter_email, v.url, v.request_method, v.request_data, v.check_string, \
     v.test_type, v.request_response_code, v.tested, v.reported, v.patched, v.published, \
     v.scanable, v.notes, v.updated_at AS updated \
     FROM vulnerabilities v LEFT JOIN organizations o ON o.id = v.organization_id";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Vulnerability {
    pub id: i32,
    pub organization_id: Option<i32>,
    /// Abbreviation of the owning organization
    pub constituent: Option<String>,
    pub incident_id: Option<i32>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    /// Proof of concept URL
    pub url: String,
    pub request_method: String,
    pub request_data: Option<String>,
    pub check_string: Option<String>,
    pub test_type: String,
    pub request_response_code: Option<i32>,
    pub tested: Option<DateTime<Utc>>,
    pub reported: DateTime<Utc>,
    pub patched: Option<DateTime<Utc>>,
    /// Listed in the hall of fame
    pub published: bool,
    pub scanable: bool,
    pub notes: Option<String>,
    pub updated: DateTime<Utc>,
}

impl Serializable for Vulnerability {
    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "constituent": self.constituent,
            "organization_id": self.organization_id,
            "incident_id": self.incident_id,
            "reporter_name": self.reporter_name,
            "reporter_email": self.reporter_email,
            "url": self.url,
            "request_method": self.request_method,
            "request_data": self.request_data,
            "check_string": self.check_string,
            "test_type": self.test_type,
            "request_response_code": self.request_response_code,
            "tested": self.tested,
            "reported": self.reported,
            "patched": self.patched,
            "published": self.published,
            "scanable": self.scanable,
            "notes": self.notes,
            "updated": self.updated,
        })
    }
}

/// Body of vulnerability create and update requests.
///
/// On update, fields left out keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VulnerabilityPayload {
    pub organization_id: Option<i32>,
    pub incident_id: Option<i32>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub url: Option<String>,
    pub request_method: Option<String>,
    pub request_data: Option<String>,
    pub check_string: Option<String>,
    pub request_response_code: Option<i32>,
    pub patched: Option<DateTime<Utc>>,
    pub published: Option<bool>,
    pub scanable: Option<bool>,
    pub notes: Option<String>,
}

impl VulnerabilityPayload {
    pub fn validate_new(&self) -> ApiResult<()> {
        if self.url.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(ApiError::BadRequest("url is required".to_string()));
        }
        if self.organization_id.is_none() {
            return Err(ApiError::BadRequest("organization_id is required".to_string()));
        }
        self.validate_update()
    }

    pub fn validate_update(&self) -> ApiResult<()> {
        if let Some(method) = &self.request_method {
            if !REQUEST_METHODS.contains(&method.as_str()) {
                return Err(ApiError::BadRequest(format!(
                    "request_method must be one of {}",
                    REQUEST_METHODS.join(", ")
                )));
            }
        }
        if let Some(email) = &self.reporter_email {
            if !email.contains('@') {
                return Err(ApiError::BadRequest("reporter_email is not a valid address".to_string()));
            }
        }
        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                return Err(ApiError::BadRequest("url cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

impl Vulnerability {
    /// One page of vulnerabilities, newest report first.
    /// `organization` restricts the listing to one constituent.
    pub async fn page(
        pool: &PgPool,
        request: PageRequest,
        organization: Option<i32>,
    ) -> sqlx::Result<(u64, Vec<Vulnerability>)> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vulnerabilities \
             WHERE deleted = 0 AND ($1::INTEGER IS NULL OR organization_id = $1)",
        )
        .bind(organization)
        .fetch_one(pool)
        .await?;

        let vulnerabilities: Vec<Vulnerability> = sqlx::query_as(&format!(
            "{SELECT} WHERE v.deleted = 0 AND ($1::INTEGER IS NULL OR v.organization_id = $1) \
             ORDER BY v.reported DESC, v.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(organization)
        .bind(request.sql_limit())
        .bind(request.sql_offset())
        .fetch_all(pool)
        .await?;

        Ok((row_count(count), vulnerabilities))
    }

    pub async fn find(pool: &PgPool, id: i32, organization: Option<i32>) -> ApiResult<Vulnerability> {
        sqlx::query_as(&format!(
            "{SELECT} WHERE v.id = $1 AND v.deleted = 0 \
             AND ($2::INTEGER IS NULL OR v.organization_id = $2)"
        ))
        .bind(id)
        .bind(organization)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound)
    }

    pub async fn create(pool: &PgPool, payload: &VulnerabilityPayload) -> ApiResult<Vulnerability> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO vulnerabilities \
             (organization_id, incident_id, reporter_name, reporter_email, url, request_method, \
              request_data, check_string, request_response_code, patched, published, scanable, notes) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'GET'), $7, $8, $9, $10, \
                     COALESCE($11, FALSE), COALESCE($12, TRUE), $13) \
             RETURNING id",
        )
        .bind(payload.organization_id)
        .bind(payload.incident_id)
        .bind(payload.reporter_name.as_deref())
        .bind(payload.reporter_email.as_deref())
        .bind(payload.url.as_deref().map(str::trim))
        .bind(payload.request_method.as_deref())
        .bind(payload.request_data.as_deref())
        .bind(payload.check_string.as_deref())
        .bind(payload.request_response_code)
        .bind(payload.patched)
        .bind(payload.published)
        .bind(payload.scanable)
        .bind(payload.notes.as_deref())
        .fetch_one(pool)
        .await
        .map_err(write_error)?;

        Self::find(pool, id, None).await
    }

    pub async fn update(pool: &PgPool, id: i32, payload: &VulnerabilityPayload) -> ApiResult<Vulnerability> {
        let updated: Option<i32> = sqlx::query_scalar(
            "UPDATE vulnerabilities SET \
             organization_id = COALESCE($2, organization_id), \
             incident_id = COALESCE($3, incident_id), \
             reporter_name = COALESCE($4, reporter_name), \
             reporter_email = COALESCE($5, reporter_email), \
             url = COALESCE($6, url), \
             request_method = COALESCE($7, request_method), \
             request_data = COALESCE($8, request_data), \
             check_string = COALESCE($9, check_string), \
             request_response_code = COALESCE($10, request_response_code), \
             patched = COALESCE($11, patched), \
             published = COALESCE($12, published), \
             scanable = COALESCE($13, scanable), \
             notes = COALESCE($14, notes) \
             WHERE id = $1 AND deleted = 0 \
             RETURNING id",
        )
        .bind(id)
        .bind(payload.organization_id)
        .bind(payload.incident_id)
        .bind(payload.reporter_name.as_deref())
        .bind(payload.reporter_email.as_deref())
        .bind(payload.url.as_deref().map(str::trim))
        .bind(payload.request_method.as_deref())
        .bind(payload.request_data.as_deref())
        .bind(payload.check_string.as_deref())
        .bind(payload.request_response_code)
        .bind(payload.patched)
        .bind(payload.published)
        .bind(payload.scanable)
        .bind(payload.notes.as_deref())
        .fetch_optional(pool)
        .await
        .map_err(write_error)?;

        match updated {
            Some(id) => Self::find(pool, id, None).await,
            None => Err(ApiError::NotFound),
        }
    }

    pub async fn soft_delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let updated: u64 = sqlx::query("UPDATE vulnerabilities SET deleted = 1 WHERE id = $1 AND deleted = 0")
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
        "Vulnerability already exists",
        "organization_id does not reference an existing organization",
    )
}
