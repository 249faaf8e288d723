// Portal users. A user belongs to organizations through memberships.

use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::models::organization::ORGANIZATION_TREE;
use crate::models::{constraint_error, Serializable};
use crate::utils::error_handler::{ApiError, ApiResult};

const MIN_PASSWORD_LENGTH: usize = 8;
const PASSWORD_SPECIALS: &str = " !#$%&'()*+,-./[\\]^_`{|}~\"";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl Serializable for User {
    fn to_value(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "email": self.email })
    }
}

/// Body of `POST /users`: the user plus the membership that attaches it
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    #[serde(alias = "login")]
    pub email: String,
    pub password: Option<String>,
    #[serde(alias = "role_id")]
    pub membership_role_id: i32,
    pub organization_id: i32,
}

impl NewUser {
    /// Trimmed name and normalized email
    pub fn validate(&self) -> ApiResult<(String, String)> {
        let name: String = required_name(&self.name)?;
        let email: String = normalize_email(&self.email)?;

        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok((name, email))
    }
}

/// Body of `PUT /users/{id}`; fields left out keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub name: Option<String>,
    #[serde(alias = "login")]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPayload {
    pub fn validate(&self) -> ApiResult<(Option<String>, Option<String>)> {
        let name: Option<String> = self.name.as_deref().map(required_name).transpose()?;
        let email: Option<String> = self.email.as_deref().map(normalize_email).transpose()?;

        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok((name, email))
    }
}

fn required_name(raw: &str) -> ApiResult<String> {
    let name: &str = raw.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Lower-cased address with one `@` and a dotted domain
pub fn normalize_email(raw: &str) -> ApiResult<String> {
    let email: String = raw.trim().to_lowercase();

    let valid: bool = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ApiError::BadRequest(format!("'{}' is not a valid email address", raw.trim())));
    }
    Ok(email)
}

/// Lists every rule the password breaks
pub fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems: Vec<&'static str> = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push("password too short");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("password has to contain a number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        problems.push("password has to contain a special character");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("password has to contain an upper case letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("password has to contain a lower case letter");
    }

    problems
}

fn check_password(password: &str) -> ApiResult<()> {
    let problems: Vec<&'static str> = password_problems(password);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Unprocessable(problems.join("; ")))
    }
}

/// bcrypt is slow on purpose, so it runs off the async workers
pub async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash(password.as_bytes(), DEFAULT_COST))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(|e| ApiError::Internal(e.into()))
}

impl User {
    /// Live users holding a live membership anywhere in `root`'s organization tree
    pub async fn in_tree(pool: &PgPool, root: i32) -> sqlx::Result<Vec<User>> {
        sqlx::query_as(&format!(
            "{ORGANIZATION_TREE} \
             SELECT DISTINCT u.id, u.name, u.email FROM users u \
             JOIN organization_memberships m ON m.user_id = u.id AND m.deleted = 0 \
             JOIN tree t ON t.id = m.organization_id \
             WHERE u.deleted = 0 ORDER BY u.id"
        ))
        .bind(root)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: i32) -> ApiResult<User> {
        sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1 AND deleted = 0")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Whether the user holds a live membership in `root`'s organization tree
    pub async fn is_managed_by(pool: &PgPool, id: i32, root: i32) -> sqlx::Result<bool> {
        sqlx::query_scalar(&format!(
            "{ORGANIZATION_TREE} \
             SELECT EXISTS(SELECT 1 FROM organization_memberships m JOIN tree t ON t.id = m.organization_id \
             WHERE m.user_id = $2 AND m.deleted = 0)"
        ))
        .bind(root)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Adds the user and its first membership together
    pub async fn create_with_membership(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
        organization_id: i32,
        membership_role_id: i32,
    ) -> ApiResult<User> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

        let user: User = sqlx::query_as(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id, name, email",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, email))?;

        sqlx::query(
            "INSERT INTO organization_memberships (user_id, organization_id, membership_role_id) \
             VALUES ($1, $2, $3)",
        )
        .bind(user.id)
        .bind(organization_id)
        .bind(membership_role_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, email))?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn update(
        pool: &PgPool,
        id: i32,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> ApiResult<User> {
        sqlx::query_as(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             password_hash = COALESCE($4, password_hash) \
             WHERE id = $1 AND deleted = 0 RETURNING id, name, email",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(pool)
        .await
        .map_err(|e| write_error(e, email.unwrap_or_default()))?
        .ok_or(ApiError::NotFound)
    }

    /// Marks the user and all of its memberships deleted
    pub async fn soft_delete(pool: &PgPool, id: i32) -> ApiResult<()> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

        let updated: u64 = sqlx::query(
            "UPDATE users SET deleted = 1, deleted_at = NOW() WHERE id = $1 AND deleted = 0",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ApiError::NotFound);
        }

        sqlx::query(
            "UPDATE organization_memberships SET deleted = 1, deleted_at = NOW() \
             WHERE user_id = $1 AND deleted = 0",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn write_error(err: sqlx::Error, email: &str) -> ApiError {
    constraint_error(
        err,
        &format!("A user with email '{email}' already exists"),
        "membership_role_id or organization_id does not reference an existing record",
    )
}
