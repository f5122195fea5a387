pub mod health;
pub mod recipes;

use crate::store::{RecipeStore, StoreError};
use crate::telemetry;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use eatinn_core::ValidationErrors;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use utoipa::{OpenApi, ToSchema};

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";
pub const UNAVAILABLE_MESSAGE: &str = "the server is busy, please try again shortly";

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub error: BTreeMap<String, String>,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}

pub fn server_error() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
}

/// A handler panicked. The request gets the generic server error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    server_error()
}

pub fn failed_validation(errors: ValidationErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorResponse {
            error: errors.into_map(),
        }),
    )
        .into_response()
}

/// Malformed bodies are the client's fault, whether the JSON itself or a
/// value inside it (such as a duration) failed to parse.
pub fn bad_request(rejection: JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match self {
            StoreError::NotFound => not_found(),
            StoreError::EditConflict => error_response(StatusCode::CONFLICT, EDIT_CONFLICT_MESSAGE),
            StoreError::Timeout | StoreError::Pool(_) => {
                tracing::error!(error = %self, "store unavailable");
                error_response(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE)
            }
            StoreError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                server_error()
            }
        }
    }
}

/// Parses a path id. Anything that isn't a positive integer is treated as a
/// missing resource.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Runs a store operation off the async runtime.
pub async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, Response>
where
    F: FnOnce(&RecipeStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.clone();
    match telemetry::run_blocking(move || f(&store)).await {
        Ok(result) => result.map_err(IntoResponse::into_response),
        Err(e) => {
            tracing::error!(error = %e, "store task failed");
            Err(server_error())
        }
    }
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "eatinn", description = "Recipe storage and search"),
        components(schemas(ErrorResponse, ValidationErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> =
        vec![health::ApiDoc::openapi(), recipes::ApiDoc::openapi()];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("9223372036854775808"), None);
    }

    #[test]
    fn test_store_error_status_codes() {
        assert_eq!(
            StoreError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::EditConflict.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            StoreError::Timeout.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            StoreError::Database(diesel::result::Error::RollbackTransaction)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_openapi_lists_all_routes() {
        let spec = openapi();
        for path in ["/v1/healthcheck", "/v1/recipes", "/v1/recipes/{id}"] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
