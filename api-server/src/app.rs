//! Router assembly.
//!
//! Route order matters only through `unmatched`: axum always prefers a
//! declared path, and anything left over (including a declared path hit
//! with the wrong method) goes to the `/api/*` echo or the 404.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::{error, handlers, middleware};

/// Build the full HTTP application (public entrypoint used by `main.rs`).
pub fn build_app(config: Config) -> Router {
    let config = Arc::new(config);
    with_layers(routes(config.clone()), config)
}

/// The route table, without any layers.
pub fn routes(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(handlers::root).fallback(handlers::unmatched))
        .route("/health", get(handlers::health).fallback(handlers::unmatched))
        .route(
            "/api/health",
            get(handlers::api_health).fallback(handlers::unmatched),
        )
        .route(
            "/api/v1/auth/sso",
            post(handlers::sso).fallback(handlers::unmatched),
        )
        .route(
            "/api/v1/status",
            get(handlers::status).fallback(handlers::unmatched),
        )
        .fallback(handlers::unmatched)
        .with_state(config)
}

/// Wrap a router with CORS, request tracing, panic recovery and JSON
/// body parsing.
///
/// Routing is case-insensitive and ignores one trailing slash. Layers on a
/// `Router` run after its routing, so the path is folded by an outer router
/// that hands everything to the layered one.
pub fn with_layers(router: Router, config: Arc<Config>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let panic_config = config.clone();
    let catch_panic =
        CatchPanicLayer::custom(move |payload: Box<dyn std::any::Any + Send + 'static>| {
            error::panic_response(&panic_config.platform, payload)
        });

    let layered = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(middleware::preflight_no_content))
            .layer(cors)
            .layer(catch_panic)
            .layer(axum::middleware::from_fn_with_state(
                config,
                middleware::parse_json_body,
            )),
    );

    Router::new()
        .fallback_service(layered)
        .layer(axum::middleware::map_request(middleware::normalize_path))
}
