use crate::api::{not_found, parse_id, with_store, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteRecipeResponse {
    pub message: String,
}

#[utoipa::path(
    delete,
    path = "/v1/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe deleted", body = DeleteRecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 503, description = "Database busy", body = ErrorResponse)
    )
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    match with_store(&state, move |store| store.delete(id)).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteRecipeResponse {
                message: "recipe successfully deleted".to_string(),
            }),
        )
            .into_response(),
        Err(response) => response,
    }
}
