// Organization memberships: a user's role and contact details within one organization

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::models::organization::ORGANIZATION_TREE;
use crate::models::user::normalize_email;
use crate::models::{constraint_error, Serializable};
use crate::utils::error_handler::{ApiError, ApiResult};

const COLUMNS: &str = "id, user_id, organization_id, membership_role_id, street, zip, city, comment, \
     email, phone, mobile, pgp_key_id, pgp_key_fingerprint";

const CONTACT_ERROR: &str = "Attribute error. Invalid email, phone or mobile?";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MembershipRole {
    pub id: i32,
    pub name: String,
    pub display_name: String,
}

impl Serializable for MembershipRole {
    fn to_value(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "display_name": self.display_name })
    }
}

impl MembershipRole {
    pub async fn all(pool: &PgPool) -> sqlx::Result<Vec<MembershipRole>> {
        sqlx::query_as("SELECT id, name, display_name FROM membership_roles WHERE deleted = 0 ORDER BY id")
            .fetch_all(pool)
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OrganizationMembership {
    pub id: i32,
    pub user_id: i32,
    pub organization_id: i32,
    pub membership_role_id: i32,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub comment: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub pgp_key_id: Option<String>,
    pub pgp_key_fingerprint: Option<String>,
}

impl Serializable for OrganizationMembership {
    fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.user_id,
            "organization_id": self.organization_id,
            "membership_role_id": self.membership_role_id,
            "street": self.street,
            "zip": self.zip,
            "city": self.city,
            "comment": self.comment,
            "email": self.email,
            "phone": self.phone,
            "mobile": self.mobile,
            "pgp_key_id": self.pgp_key_id,
            "pgp_key_fingerprint": self.pgp_key_fingerprint,
        })
    }
}

/// Body of membership create and update requests.
///
/// On update, fields left out keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MembershipPayload {
    pub user_id: Option<i32>,
    pub organization_id: Option<i32>,
    pub membership_role_id: Option<i32>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub comment: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub pgp_key_id: Option<String>,
    pub pgp_key_fingerprint: Option<String>,
}

/// International number: `+` then digits, whitespace ignored
fn normalize_phone(raw: &str) -> ApiResult<String> {
    let phone: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    match phone.strip_prefix('+') {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => Ok(phone),
        _ => Err(ApiError::Unprocessable(CONTACT_ERROR.to_string())),
    }
}

impl MembershipPayload {
    pub fn validate_new(&self) -> ApiResult<Self> {
        for (field, value) in [
            ("user_id", self.user_id),
            ("organization_id", self.organization_id),
            ("membership_role_id", self.membership_role_id),
        ] {
            if value.is_none() {
                return Err(ApiError::BadRequest(format!("'{field}' is a required property")));
            }
        }
        self.validate_update()
    }

    /// Copy with the contact fields normalized
    pub fn validate_update(&self) -> ApiResult<Self> {
        let email: Option<String> = self
            .email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .map(|email| normalize_email(email).map_err(|_| ApiError::Unprocessable(CONTACT_ERROR.to_string())))
            .transpose()?;

        let phone_field = |value: &Option<String>| -> ApiResult<Option<String>> {
            value
                .as_deref()
                .filter(|phone| !phone.trim().is_empty())
                .map(normalize_phone)
                .transpose()
        };

        Ok(Self {
            email,
            phone: phone_field(&self.phone)?,
            mobile: phone_field(&self.mobile)?,
            ..self.clone()
        })
    }
}

impl OrganizationMembership {
    /// Live memberships of every organization in `root`'s tree
    pub async fn in_tree(pool: &PgPool, root: i32) -> sqlx::Result<Vec<OrganizationMembership>> {
        sqlx::query_as(&format!(
            "{ORGANIZATION_TREE} SELECT {COLUMNS} FROM organization_memberships \
             WHERE deleted = 0 AND organization_id IN (SELECT id FROM tree) ORDER BY id"
        ))
        .bind(root)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: i32) -> ApiResult<OrganizationMembership> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM organization_memberships WHERE id = $1 AND deleted = 0"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn create(pool: &PgPool, payload: &MembershipPayload) -> ApiResult<OrganizationMembership> {
        sqlx::query_as(&format!(
            "INSERT INTO organization_memberships \
             (user_id, organization_id, membership_role_id, street, zip, city, comment, \
              email, phone, mobile, pgp_key_id, pgp_key_fingerprint) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        ))
        .bind(payload.user_id)
        .bind(payload.organization_id)
        .bind(payload.membership_role_id)
        .bind(payload.street.as_deref())
        .bind(payload.zip.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.comment.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.mobile.as_deref())
        .bind(payload.pgp_key_id.as_deref())
        .bind(payload.pgp_key_fingerprint.as_deref())
        .fetch_one(pool)
        .await
        .map_err(write_error)
    }

    pub async fn update(
        pool: &PgPool,
        id: i32,
        payload: &MembershipPayload,
    ) -> ApiResult<OrganizationMembership> {
        sqlx::query_as(&format!(
            "UPDATE organization_memberships SET \
             user_id = COALESCE($2, user_id), \
             organization_id = COALESCE($3, organization_id), \
             membership_role_id = COALESCE($4, membership_role_id), \
             street = COALESCE($5, street), \
             zip = COALESCE($6, zip), \
             city = COALESCE($7, city), \
             comment = COALESCE($8, comment), \
             email = COALESCE($9, email), \
             phone = COALESCE($10, phone), \
             mobile = COALESCE($11, mobile), \
             pgp_key_id = COALESCE($12, pgp_key_id), \
             pgp_key_fingerprint = COALESCE($13, pgp_key_fingerprint) \
             WHERE id = $1 AND deleted = 0 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(payload.user_id)
        .bind(payload.organization_id)
        .bind(payload.membership_role_id)
        .bind(payload.street.as_deref())
        .bind(payload.zip.as_deref())
        .bind(payload.city.as_deref())
        .bind(payload.comment.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.mobile.as_deref())
        .bind(payload.pgp_key_id.as_deref())
        .bind(payload.pgp_key_fingerprint.as_deref())
        .fetch_optional(pool)
        .await
        .map_err(write_error)?
        .ok_or(ApiError::NotFound)
    }

    /// A user keeps at least one live membership; deleting the last one is refused
    pub async fn soft_delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

        let user_id: i32 = sqlx::query_scalar(
            "SELECT user_id FROM organization_memberships WHERE id = $1 AND deleted = 0 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound)?;

        let live: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM organization_memberships WHERE user_id = $1 AND deleted = 0",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if live <= 1 {
            return Err(ApiError::Conflict("Last membership may not be deleted".to_string()));
        }

        sqlx::query("UPDATE organization_memberships SET deleted = 1, deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn write_error(err: sqlx::Error) -> ApiError {
    constraint_error(
        err,
        "The user already holds this role in the organization",
        "user_id, organization_id or membership_role_id does not reference an existing record",
    )
}
