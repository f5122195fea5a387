use crate::AppState;
use axum::routing::get;
use axum::{response::IntoResponse, Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/healthcheck", get(healthcheck))
}

#[utoipa::path(
    get,
    path = "/v1/healthcheck",
    tag = "health",
    responses(
        (status = 200, description = "Service is available", body = HealthResponse)
    )
)]
pub async fn healthcheck() -> impl IntoResponse {
    Json(HealthResponse {
        status: "available".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(paths(healthcheck), components(schemas(HealthResponse)))]
pub struct ApiDoc;
