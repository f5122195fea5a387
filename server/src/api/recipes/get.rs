use super::RecipeResponse;
use crate::api::{not_found, parse_id, with_store, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/v1/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 503, description = "Database busy", body = ErrorResponse)
    )
)]
pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    match with_store(&state, move |store| store.get(id)).await {
        Ok(recipe) => (StatusCode::OK, Json(RecipeResponse { recipe })).into_response(),
        Err(response) => response,
    }
}
