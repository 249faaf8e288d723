// Page envelope: one slice of a collection plus navigation metadata

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Uri},
};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;

use crate::models::Serializable;
use crate::pagination::params::PageRequest;
use crate::utils::utils::{insert_prefixed_header, original_uri, request_origin};

/// Builds absolute links to other pages of the current request.
///
/// Query parameters other than `page` and `per_page` are kept in their
/// original order so filters survive page navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    base: String,
    query: Vec<(String, String)>,
}

impl PageLinks {
    /// `base` is the absolute URL without its query, e.g. `http://do.example/api/1.0/tags`
    pub fn new(base: impl Into<String>, query: Option<&str>) -> Self {
        let query: Vec<(String, String)> = query
            .and_then(|raw| serde_urlencoded::from_str::<Vec<(String, String)>>(raw).ok())
            .unwrap_or_default()
            .into_iter()
            .filter(|(key, _)| key != "page" && key != "per_page")
            .collect();

        Self { base: base.into(), query }
    }

    pub fn from_uri(scheme: &str, host: &str, uri: &Uri) -> Self {
        Self::new(format!("{scheme}://{host}{}", uri.path()), uri.query())
    }

    pub fn link(&self, page: u64, per_page: u64) -> String {
        let mut pairs: Vec<(String, String)> = self.query.clone();
        pairs.push(("page".to_string(), page.to_string()));
        pairs.push(("per_page".to_string(), per_page.to_string()));

        let query: String = serde_urlencoded::to_string(&pairs).unwrap_or_default();
        format!("{}?{}", self.base, query)
    }
}

impl<S> FromRequestParts<S> for PageLinks
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uri: Uri = original_uri(parts);
        let base: String = format!("{}{}", request_origin(parts), uri.path());

        Ok(Self::new(base, uri.query()))
    }
}

/// One page of a collection, ready to be sent to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
    /// Items across all pages
    pub count: u64,
    pub items: Vec<Value>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub first: String,
    pub last: String,
}

impl Page {
    /// Builds a page from an already sliced result (e.g. SQL `LIMIT`/`OFFSET`)
    /// and the total item count.
    pub fn new<T: Serializable>(
        request: PageRequest,
        count: u64,
        items: &[T],
        links: &PageLinks,
    ) -> Self {
        let PageRequest { page, per_page } = request;
        let pages: u64 = request.pages(count);

        Self {
            page,
            per_page,
            count,
            items: items.iter().map(Serializable::to_value).collect(),
            prev: (page > 1).then(|| links.link(page - 1, per_page)),
            next: (page < pages).then(|| links.link(page + 1, per_page)),
            first: links.link(1, per_page),
            last: links.link(pages.max(1), per_page),
        }
    }

    /// Builds a page by slicing an in-memory collection
    pub fn from_slice<T: Serializable>(request: PageRequest, all: &[T], links: &PageLinks) -> Self {
        let start: usize = usize::try_from(request.offset()).unwrap_or(usize::MAX).min(all.len());
        let end: usize = usize::try_from(request.per_page)
            .map(|per_page| start.saturating_add(per_page))
            .unwrap_or(usize::MAX)
            .min(all.len());

        Self::new(request, all.len() as u64, &all[start..end], links)
    }

    /// `{prefix}Page-*` headers mirroring the envelope
    pub fn headers(&self, prefix: &str) -> HeaderMap {
        let mut headers: HeaderMap = HeaderMap::new();

        insert_prefixed_header(&mut headers, prefix, "Page-Current", &self.page.to_string());
        if let Some(prev) = &self.prev {
            insert_prefixed_header(&mut headers, prefix, "Page-Prev", prev);
        }
        if let Some(next) = &self.next {
            insert_prefixed_header(&mut headers, prefix, "Page-Next", next);
        }
        insert_prefixed_header(&mut headers, prefix, "Page-Item-Count", &self.count.to_string());

        headers
    }
}
