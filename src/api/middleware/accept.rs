use axum::{
    extract::Request,
    http::{header::ACCEPT, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::utils::response_handler::HandlerResponse;

const NOT_ACCEPTABLE_MESSAGE: &str = "The resource identified by the request is only capable of \
     generating response entities which have content characteristics not acceptable according \
     to the accept headers sent in the request.";

/// True when the client can take a JSON response.
/// A missing `Accept` header means anything goes.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    let values: Vec<&str> = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        return true;
    }

    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|media| media.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .any(|media| matches!(media.as_str(), "application/json" | "application/*" | "*/*"))
}

/// Answers 406 to clients that do not accept JSON
pub async fn require_json_middleware(request: Request, next: Next) -> Response {
    if !accepts_json(request.headers()) {
        return HandlerResponse::new(StatusCode::NOT_ACCEPTABLE)
            .message(NOT_ACCEPTABLE_MESSAGE)
            .into_response();
    }

    next.run(request).await
}
