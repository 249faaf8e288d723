// Start of file: src/utils/utils.rs

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, OriginalUri},
    http::{header::HOST, request::Parts, HeaderMap, HeaderName, HeaderValue, Uri},
};
use serde_json::{
    ser::PrettyFormatter, Serializer
};
use serde::Serialize;
use tracing::warn;

/*
    * Convert any `Serialize` type into a two-space-indented JSON string.
*/
pub fn to_two_space_indented_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut writer: Vec<u8> = Vec::new();

    let formatter: PrettyFormatter<'_> = PrettyFormatter::with_indent(b"  ");

    let mut ser: Serializer<&mut Vec<u8>, PrettyFormatter<'_>> =
        Serializer::with_formatter(&mut writer, formatter);

    value.serialize(&mut ser)?;

    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&writer).into_owned())
}

/*
    * Inserts `{prefix}{name}: value`, e.g. `DO-Page-Current: 2`.
    * Names or values that are not valid HTTP tokens are skipped with a warning.
*/
pub fn insert_prefixed_header(headers: &mut HeaderMap, prefix: &str, name: &str, value: &str) {
    let full_name: String = format!("{prefix}{name}");

    match (
        HeaderName::try_from(full_name.as_str()),
        HeaderValue::try_from(value),
    ) {
        (Ok(header_name), Ok(header_value)) => {
            headers.insert(header_name, header_value);
        }
        _ => warn!("Skipping invalid response header '{full_name}'"),
    }
}

/*
    * Network address of the client: the socket peer when the server runs with
    * connect info, otherwise the first `X-Forwarded-For` hop.
*/
pub fn client_address(parts: &Parts) -> String {
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/*
    * URI as the client sent it; nested routers strip their prefix from `parts.uri`.
*/
pub fn original_uri(parts: &Parts) -> Uri {
    parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| parts.uri.clone())
}

/*
    * `scheme://host` the client used, honouring `X-Forwarded-Proto` from a
    * fronting proxy.
*/
pub fn request_origin(parts: &Parts) -> String {
    let uri: Uri = original_uri(parts);

    let host: String = parts
        .headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    let scheme: String = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.scheme_str().map(str::to_owned))
        .unwrap_or_else(|| "http".to_string());

    format!("{scheme}://{host}")
}

/*
    * Escapes quotes, backslashes and NUL so a value can sit inside a
    * double-quoted audit field.
*/
pub fn addslashes(raw: &str) -> String {
    let mut escaped: String = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\0' => escaped.push_str("\\\0"),
            '\\' => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }

    escaped
}


// End of file: src/utils/utils.rs
