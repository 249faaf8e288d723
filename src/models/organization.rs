// Constituent organizations

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};

use crate::models::{constraint_error, row_count, Serializable};
use crate::pagination::PageRequest;
use crate::utils::error_handler::{ApiError, ApiResult};

const COLUMNS: &str =
    "id, parent_org_id, abbreviation, full_name, old_id, is_sla, mail_template, mail_times";

/// `tree` holds `$1` and every live organization below it
pub(crate) const ORGANIZATION_TREE: &str = "WITH RECURSIVE tree AS ( \
     SELECT id FROM organizations WHERE id = $1 AND deleted = 0 \
     UNION \
     SELECT o.id FROM organizations o JOIN tree t ON o.parent_org_id = t.id WHERE o.deleted = 0)";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Organization {
    pub id: i32,
    pub parent_org_id: Option<i32>,
    pub abbreviation: Option<String>,
    pub full_name: Option<String>,
    /// Identifier carried over from the constituency spreadsheets
    pub old_id: Option<String>,
    pub is_sla: bool,
    pub mail_template: Option<String>,
    /// Seconds between report mails
    pub mail_times: Option<i32>,
}

impl Serializable for Organization {
    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "parent_org_id": self.parent_org_id,
            "abbreviation": self.abbreviation,
            "full_name": self.full_name,
            "old_ID": self.old_id,
            "is_sla": self.is_sla,
            "mail_template": self.mail_template,
            "mail_times": self.mail_times,
        })
    }
}

/// Body of organization create and update requests.
///
/// On update, fields left out keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationPayload {
    pub parent_org_id: Option<i32>,
    pub abbreviation: Option<String>,
    pub full_name: Option<String>,
    #[serde(rename = "old_ID")]
    pub old_id: Option<String>,
    pub is_sla: Option<bool>,
    pub mail_template: Option<String>,
    pub mail_times: Option<i32>,
}

impl OrganizationPayload {
    pub fn validate_new(&self) -> ApiResult<()> {
        match self.abbreviation.as_deref().map(str::trim) {
            Some(abbreviation) if !abbreviation.is_empty() => self.validate_update(),
            _ => Err(ApiError::BadRequest("abbreviation is required".to_string())),
        }
    }

    pub fn validate_update(&self) -> ApiResult<()> {
        if let Some(old_id) = &self.old_id {
            if old_id.chars().count() > 5 {
                return Err(ApiError::BadRequest("old_ID cannot exceed 5 characters".to_string()));
            }
        }
        if matches!(self.mail_times, Some(times) if times < 0) {
            return Err(ApiError::BadRequest("mail_times cannot be negative".to_string()));
        }
        Ok(())
    }
}

impl Organization {
    pub async fn page(pool: &PgPool, request: PageRequest) -> sqlx::Result<(u64, Vec<Organization>)> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations WHERE deleted = 0")
            .fetch_one(pool)
            .await?;

        let organizations: Vec<Organization> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM organizations WHERE deleted = 0 ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(request.sql_limit())
        .bind(request.sql_offset())
        .fetch_all(pool)
        .await?;

        Ok((row_count(count), organizations))
    }

    pub async fn find(pool: &PgPool, id: i32) -> ApiResult<Organization> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM organizations WHERE id = $1 AND deleted = 0"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// The organization itself followed by its direct children
    pub async fn with_children(pool: &PgPool, id: i32) -> ApiResult<Vec<Organization>> {
        let organizations: Vec<Organization> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM organizations \
             WHERE (id = $1 OR parent_org_id = $1) AND deleted = 0 \
             ORDER BY (id <> $1), id"
        ))
        .bind(id)
        .fetch_all(pool)
        .await?;

        if organizations.first().map(|org| org.id) != Some(id) {
            return Err(ApiError::NotFound);
        }
        Ok(organizations)
    }

    /// Whether `id` is `root` itself or sits anywhere below it
    pub async fn is_within(pool: &PgPool, root: i32, id: i32) -> sqlx::Result<bool> {
        sqlx::query_scalar(&format!("{ORGANIZATION_TREE} SELECT EXISTS(SELECT 1 FROM tree WHERE id = $2)"))
            .bind(root)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, payload: &OrganizationPayload) -> ApiResult<Organization> {
        let organization: Organization = sqlx::query_as(&format!(
            "INSERT INTO organizations \
             (parent_org_id, abbreviation, full_name, old_id, is_sla, mail_template, mail_times) \
             VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), $6, $7) \
             RETURNING {COLUMNS}"
        ))
        .bind(payload.parent_org_id)
        .bind(payload.abbreviation.as_deref().map(str::trim))
        .bind(payload.full_name.as_deref())
        .bind(payload.old_id.as_deref())
        .bind(payload.is_sla)
        .bind(payload.mail_template.as_deref())
        .bind(payload.mail_times)
        .fetch_one(pool)
        .await
        .map_err(write_error)?;

        Ok(organization)
    }

    pub async fn update(pool: &PgPool, id: i32, payload: &OrganizationPayload) -> ApiResult<Organization> {
        sqlx::query_as(&format!(
            "UPDATE organizations SET \
             parent_org_id = COALESCE($2, parent_org_id), \
             abbreviation = COALESCE($3, abbreviation), \
             full_name = COALESCE($4, full_name), \
             old_id = COALESCE($5, old_id), \
             is_sla = COALESCE($6, is_sla), \
             mail_template = COALESCE($7, mail_template), \
             mail_times = COALESCE($8, mail_times) \
             WHERE id = $1 AND deleted = 0 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(payload.parent_org_id)
        .bind(payload.abbreviation.as_deref().map(str::trim))
        .bind(payload.full_name.as_deref())
        .bind(payload.old_id.as_deref())
        .bind(payload.is_sla)
        .bind(payload.mail_template.as_deref())
        .bind(payload.mail_times)
        .fetch_optional(pool)
        .await
        .map_err(write_error)?
        .ok_or(ApiError::NotFound)
    }

    /// Marks the organization deleted; it disappears from every listing
    pub async fn soft_delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let updated: u64 = sqlx::query("UPDATE organizations SET deleted = 1 WHERE id = $1 AND deleted = 0")
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

/// A parent that does not exist is the caller's mistake
fn write_error(err: sqlx::Error) -> ApiError {
    constraint_error(
        err,
        "Organization already exists",
        "parent_org_id does not reference an existing organization",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::violation;
    use sqlx::error::ErrorKind;

    #[test]
    fn serializes_legacy_id_under_its_public_name() {
        let org: Organization = Organization {
            id: 185,
            parent_org_id: Some(95),
            abbreviation: Some("CERT-EU".to_string()),
            full_name: None,
            old_id: Some("00".to_string()),
            is_sla: true,
            mail_template: Some("EnglishReport".to_string()),
            mail_times: Some(3600),
        };
        let value: Value = org.to_value();

        assert_eq!(value["old_ID"], "00");
        assert_eq!(value["parent_org_id"], 95);
        assert_eq!(value["full_name"], Value::Null);
        assert!(value.get("deleted").is_none());
    }

    #[test]
    fn new_organizations_need_an_abbreviation() {
        let payload: OrganizationPayload = serde_json::from_value(json!({ "full_name": "Example" })).unwrap();
        assert!(matches!(payload.validate_new(), Err(ApiError::BadRequest(_))));

        let payload: OrganizationPayload =
            serde_json::from_value(json!({ "abbreviation": "EX", "old_ID": "07" })).unwrap();
        assert!(payload.validate_new().is_ok());
        assert_eq!(payload.old_id.as_deref(), Some("07"));
    }

    #[test]
    fn rejects_negative_mail_interval() {
        let payload: OrganizationPayload = OrganizationPayload {
            mail_times: Some(-1),
            ..OrganizationPayload::default()
        };
        assert!(matches!(payload.validate_update(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn unknown_parent_is_a_bad_request() {
        let err: ApiError = write_error(violation(ErrorKind::ForeignKeyViolation));

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("parent_org_id"));
    }
}
