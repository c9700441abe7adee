//! Fault handling: every failure a request can hit ends up as the same
//! 500 envelope.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::handlers::timestamp;

/// Faults raised while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request entity too large")]
    BodyTooLarge,

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("{0}")]
    MalformedJson(#[from] serde_json::Error),

    /// Top-level JSON value that is neither an object nor an array.
    #[error("Unexpected token {token} in JSON at position {position}")]
    UnexpectedToken { token: char, position: usize },
}

impl ApiError {
    /// Log the fault and render it for a client.
    pub fn into_response_for(self, platform: &str) -> Response {
        tracing::error!(error = ?self, "server error: {}", self);
        internal_error(platform, &self.to_string())
    }
}

/// The 500 envelope. `message` is sent to the client as-is.
pub fn internal_error(platform: &str, message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "message": message,
            "timestamp": timestamp(),
            "platform": platform,
        })),
    )
        .into_response()
}

/// Render a panic payload caught by `CatchPanicLayer`.
pub fn panic_response(platform: &str, payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(error = %message, "handler panicked");
    internal_error(platform, &message)
}
