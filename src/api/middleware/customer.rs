// Customer portal caller identification

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::utils::error_handler::ApiError;

/// Header naming the organization a customer portal request acts for
pub const ORGANIZATION_HEADER: &str = "cp-organization-id";

/// The organization behind a customer portal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    pub organization_id: i32,
}

impl Customer {
    /// Reads the organization from the request headers.
    /// Missing, non-numeric and non-positive ids are all refused.
    pub fn from_parts(parts: &Parts) -> Result<Self, ApiError> {
        let raw: &str = parts
            .headers
            .get(ORGANIZATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing organization".to_string()))?;

        match raw.trim().parse::<i32>() {
            Ok(organization_id) if organization_id > 0 => Ok(Self { organization_id }),
            _ => Err(ApiError::Unauthorized("Invalid organization".to_string())),
        }
    }
}

impl<S> FromRequestParts<S> for Customer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cp/1.0/fqdns");
        if let Some(value) = header {
            builder = builder.header("CP-Organization-Id", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_the_organization_header() {
        assert_eq!(Customer::from_parts(&parts(Some("185"))).unwrap().organization_id, 185);
    }

    #[test]
    fn missing_or_invalid_ids_are_unauthorized() {
        for header in [None, Some("abc"), Some("0"), Some("-3")] {
            let err: ApiError = Customer::from_parts(&parts(header)).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }
}
