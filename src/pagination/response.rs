// Turns a Page into an HTTP response with page headers attached

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::error;

use crate::pagination::page::Page;
use crate::pagination::params::Pagination;
use crate::utils::response_handler::HandlerResponse;

/// A page plus the header prefix of the surface that produced it
#[derive(Debug, Clone)]
pub struct PagedResponse {
    pub page: Page,
    pub header_prefix: String,
}

impl PagedResponse {
    pub fn new(page: Page, pagination: &Pagination) -> Self {
        Self {
            page,
            header_prefix: pagination.header_prefix.clone(),
        }
    }
}

impl IntoResponse for PagedResponse {
    fn into_response(self) -> Response {
        let headers: HeaderMap = self.page.headers(&self.header_prefix);

        let data: Value = match serde_json::to_value(&self.page) {
            Ok(data) => data,
            Err(err) => {
                error!("Failed to serialize page: {}", err);
                return HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR).into_response();
            }
        };

        HandlerResponse::new(StatusCode::OK)
            .data(data)
            .headers(headers)
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Serializable;
    use crate::pagination::{page::PageLinks, params::PageRequest};
    use serde_json::json;

    struct Name(&'static str);

    impl Serializable for Name {
        fn to_value(&self) -> Value {
            json!({ "name": self.0 })
        }
    }

    #[test]
    fn response_carries_envelope_and_headers() {
        let pagination: Pagination = Pagination::new(2, 2, "DO-");
        let links: PageLinks = PageLinks::new("http://do.test/api/1.0/tags", None);
        let all: [Name; 3] = [Name("Red"), Name("Amber"), Name("Green")];
        let page: Page = Page::from_slice(PageRequest { page: 2, per_page: 2 }, &all, &links);

        let response: Response = PagedResponse::new(page, &pagination).into_response();
        let handler: &HandlerResponse = response.extensions().get::<HandlerResponse>().unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["do-page-current"], "2");
        assert_eq!(response.headers()["do-page-item-count"], "3");
        assert_eq!(handler.data["items"], json!([{ "name": "Green" }]));
        assert_eq!(handler.data["next"], Value::Null);
        assert_eq!(handler.data["prev"], "http://do.test/api/1.0/tags?page=1&per_page=2");
    }
}
