//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and the shared services
//! - `routes/`: HTTP handlers, one file per resource
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: JSON error responses

use std::sync::Arc;

use axum::{Extension, Router, body::Body, http::Request};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, info_span};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services))
}

/// Router over already constructed services.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.accounts.tokens().clone(),
    };

    // Authentication applies to matched protected routes only, so unknown
    // paths still answer 404 rather than 401.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(services)),
        )
}

// Headers are left out: they carry bearer tokens.
fn make_span(request: &Request<Body>) -> Span {
    info_span!(
        "http-request",
        method = %request.method(),
        path = request.uri().path(),
    )
}
