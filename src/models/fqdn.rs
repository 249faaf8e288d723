// Fully qualified domain names owned by an organization

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};

use crate::models::{constraint_error, Serializable};
use crate::utils::error_handler::{ApiError, ApiResult};

const MAX_FQDN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;
const COLUMNS: &str = "id, organization_id, fqdn";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Fqdn {
    pub id: i32,
    pub organization_id: i32,
    pub fqdn: String,
}

impl Serializable for Fqdn {
    fn to_value(&self) -> Value {
        json!({ "id": self.id, "fqdn": self.fqdn })
    }
}

/// Lower-cased name without a trailing dot, if it is a valid domain name
pub fn normalize_fqdn(raw: &str) -> ApiResult<String> {
    let name: String = raw.trim().trim_end_matches('.').to_ascii_lowercase();

    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    if name.len() > MAX_FQDN_LENGTH || !name.contains('.') || !name.split('.').all(valid_label) {
        return Err(ApiError::BadRequest(format!("'{}' is not a valid FQDN", raw.trim())));
    }

    Ok(name)
}

/// Body of the customer portal's FQDN create and update requests
#[derive(Debug, Clone, Deserialize)]
pub struct NewFqdn {
    pub fqdn: String,
}

impl NewFqdn {
    pub fn normalized(&self) -> ApiResult<String> {
        normalize_fqdn(&self.fqdn)
    }
}

/// Body of the analyst API's FQDN requests, which also pick the owner
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FqdnPayload {
    pub fqdn: Option<String>,
    pub organization_id: Option<i32>,
}

impl FqdnPayload {
    /// Owner and normalized name of a new FQDN
    pub fn validate_new(&self) -> ApiResult<(i32, String)> {
        let organization_id: i32 = self
            .organization_id
            .ok_or_else(|| ApiError::BadRequest("organization_id is required".to_string()))?;

        match self.fqdn.as_deref() {
            Some(raw) => Ok((organization_id, normalize_fqdn(raw)?)),
            None => Err(ApiError::BadRequest("fqdn is required".to_string())),
        }
    }

    /// Normalized name when the update renames the FQDN
    pub fn validate_update(&self) -> ApiResult<Option<String>> {
        self.fqdn.as_deref().map(normalize_fqdn).transpose()
    }
}

/// `/fqdns/{fqdn}` accepts either the numeric id or the name itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FqdnKey {
    Id(i32),
    Name(String),
}

impl FqdnKey {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i32>() {
            Ok(id) => FqdnKey::Id(id),
            Err(_) => FqdnKey::Name(raw.trim().trim_end_matches('.').to_ascii_lowercase()),
        }
    }
}

impl Fqdn {
    pub async fn all(pool: &PgPool) -> sqlx::Result<Vec<Fqdn>> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM fqdns WHERE deleted = 0 ORDER BY fqdn, id"))
            .fetch_all(pool)
            .await
    }

    pub async fn for_organization(pool: &PgPool, organization_id: i32) -> sqlx::Result<Vec<Fqdn>> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM fqdns WHERE organization_id = $1 AND deleted = 0 ORDER BY fqdn"
        ))
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    /// Looks an FQDN up by id or name. `organization` restricts the search to one owner.
    pub async fn find(pool: &PgPool, key: &FqdnKey, organization: Option<i32>) -> ApiResult<Fqdn> {
        let found: Option<Fqdn> = match key {
            FqdnKey::Id(id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM fqdns WHERE id = $1 AND deleted = 0 \
                     AND ($2::INTEGER IS NULL OR organization_id = $2)"
                ))
                .bind(*id)
                .bind(organization)
                .fetch_optional(pool)
                .await?
            }
            FqdnKey::Name(name) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM fqdns WHERE fqdn = $1 AND deleted = 0 \
                     AND ($2::INTEGER IS NULL OR organization_id = $2) ORDER BY id LIMIT 1"
                ))
                .bind(name.as_str())
                .bind(organization)
                .fetch_optional(pool)
                .await?
            }
        };

        found.ok_or(ApiError::NotFound)
    }

    /// Registers `fqdn` for the organization. A live duplicate is rejected by
    /// the partial unique index on `(organization_id, fqdn)`.
    pub async fn create(pool: &PgPool, organization_id: i32, fqdn: &str) -> ApiResult<Fqdn> {
        sqlx::query_as(&format!(
            "INSERT INTO fqdns (organization_id, fqdn) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(organization_id)
        .bind(fqdn)
        .fetch_one(pool)
        .await
        .map_err(|e| write_error(e, fqdn))
    }

    /// Renames and/or moves an FQDN. `organization` limits the update to one owner.
    pub async fn update(
        pool: &PgPool,
        id: i32,
        organization: Option<i32>,
        fqdn: Option<&str>,
        new_owner: Option<i32>,
    ) -> ApiResult<Fqdn> {
        sqlx::query_as(&format!(
            "UPDATE fqdns SET fqdn = COALESCE($3, fqdn), organization_id = COALESCE($4, organization_id) \
             WHERE id = $1 AND deleted = 0 AND ($2::INTEGER IS NULL OR organization_id = $2) \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(organization)
        .bind(fqdn)
        .bind(new_owner)
        .fetch_optional(pool)
        .await
        .map_err(|e| write_error(e, fqdn.unwrap_or_default()))?
        .ok_or(ApiError::NotFound)
    }

    pub async fn soft_delete(pool: &PgPool, id: i32, organization: Option<i32>) -> ApiResult<()> {
        let updated: u64 = sqlx::query(
            "UPDATE fqdns SET deleted = 1 WHERE id = $1 AND deleted = 0 \
             AND ($2::INTEGER IS NULL OR organization_id = $2)",
        )
        .bind(id)
        .bind(organization)
        .execute(pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

fn write_error(err: sqlx::Error, fqdn: &str) -> ApiError {
    constraint_error(
        err,
        &format!("FQDN '{fqdn}' already registered"),
        "organization_id does not reference an existing organization",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::violation;
    use sqlx::error::ErrorKind;

    fn normalized(raw: &str) -> ApiResult<String> {
        NewFqdn { fqdn: raw.to_string() }.normalized()
    }

    #[test]
    fn normalizes_case_and_trailing_dot() {
        assert_eq!(normalized(" CERT.Europa.EU. ").unwrap(), "cert.europa.eu");
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(normalized("localhost").is_err());
        assert!(normalized("bad_label.example.org").is_err());
        assert!(normalized("-dash.example.org").is_err());
        assert!(normalized("a..b").is_err());
        assert!(normalized(&format!("{}.org", "a".repeat(64))).is_err());
    }

    #[test]
    fn hides_the_owner_in_output() {
        let fqdn: Fqdn = Fqdn { id: 1, organization_id: 9, fqdn: "cert.europa.eu".to_string() };
        assert_eq!(fqdn.to_value(), json!({ "id": 1, "fqdn": "cert.europa.eu" }));
    }

    #[test]
    fn path_keys_are_ids_or_names() {
        assert_eq!(FqdnKey::parse("42"), FqdnKey::Id(42));
        assert_eq!(FqdnKey::parse("CERT.europa.eu."), FqdnKey::Name("cert.europa.eu".to_string()));
    }

    #[test]
    fn analyst_payload_needs_an_owner_and_a_name() {
        let missing_owner: FqdnPayload = FqdnPayload { fqdn: Some("cert.europa.eu".into()), organization_id: None };
        assert!(missing_owner.validate_new().is_err());

        let ok: FqdnPayload = FqdnPayload { fqdn: Some("Cert.Europa.eu".into()), organization_id: Some(3) };
        assert_eq!(ok.validate_new().unwrap(), (3, "cert.europa.eu".to_string()));

        assert_eq!(FqdnPayload::default().validate_update().unwrap(), None);
    }

    #[test]
    fn concurrent_duplicates_are_conflicts() {
        let err: ApiError = write_error(violation(ErrorKind::UniqueViolation), "cert.europa.eu");

        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(err.to_string().contains("cert.europa.eu"));
    }

    #[test]
    fn unknown_owner_is_a_bad_request() {
        let err: ApiError = write_error(violation(ErrorKind::ForeignKeyViolation), "cert.europa.eu");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
