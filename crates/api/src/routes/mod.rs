//! HTTP route handlers.
//!
//! # Routes
//!
//! ```text
//! GET    /                 - Service info
//! GET    /health           - Liveness
//! GET    /health/ready     - Readiness (store ping)
//! GET    /customers        - List (token)
//! POST   /customers        - Create (token)
//! GET    /customers/{id}   - Fetch (token)
//! PUT    /customers/{id}   - Replace (token)
//! DELETE /customers/{id}   - Delete (token)
//! ```

pub mod customers;
pub mod health;
pub mod info;

use axum::{Router, http::Uri, middleware::from_fn, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::{AppError, expose_error_detail};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Customer CRUD routes, mounted under `/customers`.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list).post(customers::create))
        .route(
            "/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::delete),
        )
}

/// Application routes without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(info::index))
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/customers", customer_routes())
        .fallback(route_not_found)
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_owned())
}

/// Build the full application with its middleware stack.
pub fn router(state: AppState) -> Router {
    let mut app = routes();
    if state.config().environment.is_development() {
        app = app.layer(from_fn(expose_error_detail));
    }

    app.layer(CorsLayer::permissive())
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
