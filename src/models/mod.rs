// Start of file: /src/models/mod.rs

/*
    * Domain entities stored in PostgreSQL, their request payloads and the
    * queries that load them.
*/

use serde_json::Value;

use crate::utils::error_handler::ApiError;

pub mod deliverable;
pub mod deliverable_file;
pub mod fqdn;
pub mod membership;
pub mod organization;
pub mod tag;
pub mod user;
pub mod vulnerability;

pub use deliverable::{Deliverable, DeliverablePayload};
pub use deliverable_file::{DeliverableFile, NewDeliverableFiles};
pub use fqdn::{Fqdn, FqdnPayload, NewFqdn};
pub use membership::{MembershipPayload, MembershipRole, OrganizationMembership};
pub use organization::{Organization, OrganizationPayload};
pub use tag::{Tag, TagPayload};
pub use user::{NewUser, User, UserPayload};
pub use vulnerability::{Vulnerability, VulnerabilityPayload};

/// Public JSON representation of an entity.
///
/// Only fields meant for API clients appear in the output; internal columns
/// such as soft-delete flags stay hidden.
pub trait Serializable {
    fn to_value(&self) -> Value;
}

impl<T: Serializable> Serializable for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

/// Converts a `COUNT(*)` result into an item count
pub(crate) fn row_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Turns constraint violations raised by a write into client errors.
///
/// A duplicate row answers 409 with `conflict`, a reference to a missing row
/// answers 400 with `reference`. Anything else stays a database error.
pub(crate) fn constraint_error(err: sqlx::Error, conflict: &str, reference: &str) -> ApiError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return ApiError::Conflict(conflict.to_string());
        }
        if db.is_foreign_key_violation() {
            return ApiError::BadRequest(reference.to_string());
        }
    }
    ApiError::Database(err)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{error::Error as StdError, fmt};

    /// Stand-in for a driver error carrying a constraint kind
    #[derive(Debug)]
    pub(crate) struct ConstraintViolation(pub ErrorKind);

    impl fmt::Display for ConstraintViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint violated: {:?}", self.0)
        }
    }

    impl StdError for ConstraintViolation {}

    impl DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    pub(crate) fn violation(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintViolation(kind)))
    }

    #[test]
    fn duplicate_rows_become_conflicts() {
        let err: ApiError = constraint_error(violation(ErrorKind::UniqueViolation), "taken", "unknown");

        assert!(matches!(err, ApiError::Conflict(ref message) if message == "taken"));
    }

    #[test]
    fn missing_references_become_bad_requests() {
        let err: ApiError = constraint_error(violation(ErrorKind::ForeignKeyViolation), "taken", "unknown");

        assert!(matches!(err, ApiError::BadRequest(ref message) if message == "unknown"));
    }

    #[test]
    fn other_failures_stay_database_errors() {
        let err: ApiError = constraint_error(violation(ErrorKind::CheckViolation), "taken", "unknown");
        assert!(matches!(err, ApiError::Database(_)));

        let err: ApiError = constraint_error(sqlx::Error::PoolTimedOut, "taken", "unknown");
        assert!(matches!(err, ApiError::Database(_)));
    }
}

// End of file: /src/models/mod.rs
