// Page selection from the query string, clamped to the surface's limits

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::config::environment::EnvironmentVariables;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 20;

/// Raw `page` / `per_page` query parameters.
///
/// Values that are not integers are ignored rather than rejected, the same
/// as leaving them out. A repeated parameter counts by its first occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    pub fn from_query(query: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = query
            .and_then(|raw| serde_urlencoded::from_str::<Vec<(String, String)>>(raw).ok())
            .unwrap_or_default();

        let first = |name: &str| -> Option<i64> {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.trim().parse().ok())
        };

        Self {
            page: first("page"),
            per_page: first("per_page"),
        }
    }
}

impl<S> FromRequestParts<S> for PageParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query()))
    }
}

/// Pagination settings for one API surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub default_per_page: u64,
    pub max_per_page: u64,
    /// Prefix for the page headers, e.g. `DO-` or `CP-`
    pub header_prefix: String,
}

impl Pagination {
    pub fn new(default_per_page: u64, max_per_page: u64, header_prefix: impl Into<String>) -> Self {
        let max_per_page: u64 = max_per_page.max(1);

        Self {
            default_per_page: default_per_page.clamp(1, max_per_page),
            max_per_page,
            header_prefix: header_prefix.into(),
        }
    }

    pub fn from_env(env: &EnvironmentVariables, header_prefix: impl Into<String>) -> Self {
        Self::new(env.default_per_page, env.max_per_page, header_prefix)
    }

    /// Resolves raw parameters into a valid page request.
    ///
    /// `page` is at least 1. `per_page` falls back to the default, is capped at
    /// the maximum without complaint, and is at least 1.
    pub fn request(&self, params: &PageParams) -> PageRequest {
        let page: u64 = params
            .page
            .map(|page| u64::try_from(page).unwrap_or(0).max(DEFAULT_PAGE))
            .unwrap_or(DEFAULT_PAGE);

        let per_page: u64 = params
            .per_page
            .map(|per_page| u64::try_from(per_page).unwrap_or(0))
            .unwrap_or(self.default_per_page)
            .clamp(1, self.max_per_page);

        PageRequest { page, per_page }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE, MAX_PER_PAGE, "DO-")
    }
}

/// A validated page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Number of items before the first one on this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Number of items on a full page
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    /// `OFFSET` value for SQL queries
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }

    /// `LIMIT` value for SQL queries
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.limit()).unwrap_or(i64::MAX)
    }

    /// Total number of pages for `count` items
    pub fn pages(&self, count: u64) -> u64 {
        count.div_ceil(self.per_page.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, per_page: Option<i64>) -> PageParams {
        PageParams { page, per_page }
    }

    #[test]
    fn defaults_apply_when_parameters_are_missing() {
        let pagination: Pagination = Pagination::new(10, 50, "DO-");
        let request: PageRequest = pagination.request(&PageParams::default());

        assert_eq!(request, PageRequest { page: 1, per_page: 10 });
    }

    #[test]
    fn per_page_above_maximum_is_clamped() {
        let pagination: Pagination = Pagination::new(10, 50, "DO-");
        let request: PageRequest = pagination.request(&params(Some(2), Some(500)));

        assert_eq!(request.per_page, 50);
        assert_eq!(request.page, 2);
    }

    #[test]
    fn page_and_per_page_are_at_least_one() {
        let pagination: Pagination = Pagination::default();

        assert_eq!(pagination.request(&params(Some(0), Some(0))), PageRequest { page: 1, per_page: 1 });
        assert_eq!(pagination.request(&params(Some(-4), Some(-1))), PageRequest { page: 1, per_page: 1 });
    }

    #[test]
    fn default_per_page_never_exceeds_maximum() {
        let pagination: Pagination = Pagination::new(100, 20, "CP-");
        assert_eq!(pagination.default_per_page, 20);
    }

    #[test]
    fn offsets_and_page_counts() {
        let request: PageRequest = PageRequest { page: 3, per_page: 20 };

        assert_eq!(request.offset(), 40);
        assert_eq!(request.sql_offset(), 40);
        assert_eq!(request.sql_limit(), 20);
        assert_eq!(request.pages(0), 0);
        assert_eq!(request.pages(40), 2);
        assert_eq!(request.pages(41), 3);
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let parsed: PageParams = PageParams::from_query(Some("page=abc&per_page=5"));

        assert_eq!(parsed.page, None);
        assert_eq!(parsed.per_page, Some(5));
    }

    #[test]
    fn repeated_parameters_keep_the_first_value() {
        let parsed: PageParams = PageParams::from_query(Some("page=2&page=3&per_page=x&per_page=7"));

        assert_eq!(parsed.page, Some(2));
        assert_eq!(parsed.per_page, None);
    }

    #[test]
    fn unparseable_query_strings_are_ignored() {
        assert_eq!(PageParams::from_query(None), PageParams::default());
        assert_eq!(PageParams::from_query(Some("page=%ZZ")), PageParams::default());
    }
}
