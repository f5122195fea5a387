use super::RecipeResponse;
use crate::api::{
    bad_request, failed_validation, not_found, parse_id, with_store, ErrorResponse,
    ValidationErrorResponse,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use eatinn_core::{IngredientEntry, InstructionStep, Recipe, Timing};
use serde::Deserialize;
use utoipa::ToSchema;

/// Fields to change. Absent or null fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<IngredientEntry>>,
    pub required_equipment: Option<Vec<String>>,
    pub instructions: Option<Vec<InstructionStep>>,
    pub notes: Option<String>,
    pub display_url: Option<String>,
    pub source_url: Option<String>,
    #[schema(value_type = Option<String>, example = "20m")]
    pub prep_time: Option<Timing>,
    #[schema(value_type = Option<String>, example = "1h")]
    pub active_time: Option<Timing>,
    pub public: Option<bool>,
    pub servings: Option<i32>,
}

impl UpdateRecipeRequest {
    pub fn apply(self, recipe: &mut Recipe) {
        fn merge<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        merge(&mut recipe.name, self.name);
        merge(&mut recipe.description, self.description);
        merge(&mut recipe.ingredients, self.ingredients);
        merge(&mut recipe.required_equipment, self.required_equipment);
        merge(&mut recipe.instructions, self.instructions);
        merge(&mut recipe.notes, self.notes);
        merge(&mut recipe.display_url, self.display_url);
        merge(&mut recipe.source_url, self.source_url);
        merge(&mut recipe.prep_time, self.prep_time);
        merge(&mut recipe.active_time, self.active_time);
        merge(&mut recipe.public, self.public);
        merge(&mut recipe.servings, self.servings);
    }
}

#[utoipa::path(
    patch,
    path = "/v1/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 409, description = "Recipe was changed concurrently", body = ErrorResponse),
        (status = 422, description = "Invalid recipe", body = ValidationErrorResponse),
        (status = 503, description = "Database busy", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return not_found();
    };

    let mut recipe = match with_store(&state, move |store| store.get(id)).await {
        Ok(recipe) => recipe,
        Err(response) => return response,
    };

    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection),
    };

    request.apply(&mut recipe);
    if let Err(errors) = recipe.validate() {
        return failed_validation(errors);
    }

    // The version read above is the one the update must still match.
    let result = with_store(&state, move |store| {
        store.update(&mut recipe)?;
        Ok(recipe)
    })
    .await;

    match result {
        Ok(recipe) => (StatusCode::OK, Json(RecipeResponse { recipe })).into_response(),
        Err(response) => response,
    }
}
