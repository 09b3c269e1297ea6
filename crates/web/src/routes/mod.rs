//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (pings the store)
//!
//! GET    /                     - Person list (open to anonymous visitors)
//!
//! # People (logged-in, verified users only)
//! GET    /pessoas              - Person list
//! GET    /pessoas/manutencao   - New person form
//! POST   /pessoas              - Create person
//! GET    /pessoas/edit/{id}    - Edit form
//! PUT    /pessoas/edit/{id}    - Update person
//! DELETE /pessoas/{id}         - Delete person
//!
//! # Assets
//! GET    /build/*              - Client bundle
//! ```

pub mod people;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Person routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(people::home))
        .route("/pessoas", get(people::index).post(people::store))
        .route("/pessoas/manutencao", get(people::manutencao))
        .route("/pessoas/edit/{id}", get(people::edit).put(people::update))
        .route("/pessoas/{id}", delete(people::destroy))
}

/// Health routes; never gated.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// The complete application: routes, assets, sessions, request ids and
/// request tracing.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let assets = ServeDir::new(&state.config().assets.dir);

    Router::new()
        .merge(health_routes())
        .merge(routes())
        .nest_service("/build", assets)
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
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
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
