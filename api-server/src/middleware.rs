use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{OriginalUri, Request, State},
    http::{header, uri::PathAndQuery, HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use serde::de::IgnoredAny;

use crate::config::Config;
use crate::error::ApiError;

/// Largest JSON body accepted (100 KiB).
pub const JSON_BODY_LIMIT: usize = 100 * 1024;

/// Parse JSON request bodies before routing.
///
/// Handlers never look at the body, but a request that claims to carry
/// JSON and doesn't is a fault on every route, matched or not.
pub async fn parse_json_body(
    State(config): State<Arc<Config>>,
    req: Request,
    next: Next,
) -> Response {
    if !is_json(req.headers()) {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let bytes = match read_json(body).await {
        Ok(bytes) => bytes,
        Err(err) => return err.into_response_for(&config.platform),
    };

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn read_json(body: Body) -> Result<Bytes, ApiError> {
    let bytes = axum::body::to_bytes(body, JSON_BODY_LIMIT)
        .await
        .map_err(|err| {
            let err = err.into_inner();
            if err.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::BodyTooLarge
            } else {
                ApiError::BodyRead(err.to_string())
            }
        })?;

    // An empty body is treated as no body at all.
    if bytes.is_empty() {
        return Ok(bytes);
    }

    // Only objects and arrays are accepted at the top level.
    if let Some(position) = bytes.iter().position(|b| !is_json_whitespace(*b)) {
        if !matches!(bytes[position], b'{' | b'[') {
            let token = String::from_utf8_lossy(&bytes[position..])
                .chars()
                .next()
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(ApiError::UnexpectedToken { token, position });
        }
    }

    serde_json::from_slice::<IgnoredAny>(&bytes)?;

    Ok(bytes)
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Fold the path used for routing: lowercase, at most one trailing slash
/// dropped. Handlers still see the client's URL through `OriginalUri`.
pub async fn normalize_path(mut req: Request) -> Request {
    if req.extensions().get::<OriginalUri>().is_none() {
        let original = OriginalUri(req.uri().clone());
        req.extensions_mut().insert(original);
    }

    if let Some(uri) = routing_uri(req.uri()) {
        *req.uri_mut() = uri;
    }
    req
}

// `None` when the path is already in routing form.
fn routing_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let trimmed = match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    };
    let folded = trimmed.to_ascii_lowercase();
    if folded == path {
        return None;
    }

    let path_and_query = match uri.query() {
        Some(query) => format!("{folded}?{query}"),
        None => folded,
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// The CORS layer answers every `OPTIONS` request itself; report those
/// answers as 204 No Content.
pub async fn preflight_no_content(req: Request, next: Next) -> Response {
    let preflight = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
