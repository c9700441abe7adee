use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::config::Config;

pub const SERVICE_NAME: &str = "AltaMedica API Server";

/// Listed in the `/api/*` echo and the 404 body.
pub const AVAILABLE_ENDPOINTS: [&str; 5] = [
    "/",
    "/health",
    "/api/health",
    "/api/v1/status",
    "/api/v1/auth/sso",
];

/// Current time as RFC 3339 UTC with milliseconds, e.g. `2026-01-01T00:00:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Path plus query string, as the client sent it.
fn request_url(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

// GET /
pub async fn root(
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
) -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "status": "healthy",
        "timestamp": timestamp(),
        "platform": config.platform,
        "version": env!("CARGO_PKG_VERSION"),
        "url": request_url(&uri),
        "method": method.as_str(),
    }))
}

// GET /health
pub async fn health(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "platform": config.platform,
        "message": format!("{SERVICE_NAME} is running on {}", config.platform),
    }))
}

// GET /api/health
pub async fn api_health(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "message": "API health check successful",
        "platform": config.platform,
    }))
}

// POST /api/v1/auth/sso
//
// Reports configuration only; nothing is authenticated.
pub async fn sso(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "SSO endpoint ready",
        "timestamp": timestamp(),
        "platform": config.platform,
        "data": {
            "authStatus": "endpoint_ready",
            "supabaseConnected": config.supabase_connected(),
            "jwtConfigured": config.jwt_configured(),
        },
    }))
}

// GET /api/v1/status
pub async fn status(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "status": "operational",
        "timestamp": timestamp(),
        "platform": config.platform,
        "environment": config.environment(),
        "endpoints": {
            "health": "/health",
            "apiHealth": "/api/health",
            "auth": "/api/v1/auth/sso",
            "status": "/api/v1/status",
        },
    }))
}

/// Everything no route (or no method on a route) claimed.
///
/// Paths under `/api/` (any case, `/api/` itself included) get the generic
/// echo, the rest get a 404.
pub async fn unmatched(
    State(config): State<Arc<Config>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
) -> Response {
    if is_api_path(uri.path()) {
        api_echo(&config, &uri, &method).into_response()
    } else {
        not_found(&config, &uri).into_response()
    }
}

fn is_api_path(path: &str) -> bool {
    path.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("/api/"))
}

fn api_echo(config: &Config, uri: &Uri, method: &Method) -> Json<Value> {
    Json(json!({
        "message": "AltaMedica API Endpoint",
        "endpoint": request_url(uri),
        "method": method.as_str(),
        "timestamp": timestamp(),
        "platform": config.platform,
        "availableEndpoints": AVAILABLE_ENDPOINTS,
    }))
}

fn not_found(config: &Config, uri: &Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "path": request_url(uri),
            "timestamp": timestamp(),
            "platform": config.platform,
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'), "{ts}");
        // 2026-01-01T00:00:00.000Z
        assert_eq!(ts.len(), 24, "{ts}");

        let parsed = DateTime::parse_from_rfc3339(&ts).unwrap();
        let skew = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
        assert!(skew.num_seconds().abs() < 5);
    }

    #[test]
    fn test_is_api_path() {
        assert!(is_api_path("/api/"));
        assert!(is_api_path("/api/unknown"));
        assert!(is_api_path("/API/Unknown"));
        assert!(!is_api_path("/api"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/"));
    }

    #[test]
    fn test_request_url_keeps_query() {
        let uri: Uri = "/api/x?a=1".parse().unwrap();
        assert_eq!(request_url(&uri), "/api/x?a=1");

        let uri: Uri = "/plain".parse().unwrap();
        assert_eq!(request_url(&uri), "/plain");
    }
}
