pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod raw_sql;
pub mod schema;
pub mod store;
pub mod telemetry;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware;
use axum::Router;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

pub use store::{RecipeStore, StoreError};

/// Application state shared across all handlers
pub type AppState = Arc<RecipeStore>;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> axum::response::Response;

/// Turns a panicking handler into a 500 instead of a dropped connection.
pub fn recover_panics() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(api::panic_response as PanicHandler)
}

/// Builds the full application: versioned API, Swagger UI and request tracing.
pub fn app(state: AppState) -> Router {
    let api_router = Router::new()
        .merge(api::health::router())
        .nest("/recipes", api::recipes::router());

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .nest("/v1", api_router)
        .merge(swagger_ui)
        .with_state(state)
        .layer(recover_panics())
        .layer(middleware::from_fn(telemetry::db_query_count_header_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Don't create a span at all for noisy endpoints
                    if matched_path == "/v1/healthcheck" {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(telemetry::query_counting_middleware))
}
