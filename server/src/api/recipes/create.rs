use super::RecipeResponse;
use crate::api::{bad_request, failed_validation, with_store, ErrorResponse, ValidationErrorResponse};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use eatinn_core::{IngredientEntry, InstructionStep, Recipe, Timing};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: String,
    pub ingredients: Option<Vec<IngredientEntry>>,
    pub required_equipment: Option<Vec<String>>,
    pub instructions: Option<Vec<InstructionStep>>,
    pub notes: String,
    pub display_url: String,
    pub source_url: String,
    /// Duration text such as "1h30m".
    #[schema(value_type = String, example = "20m")]
    pub prep_time: Timing,
    #[schema(value_type = String, example = "1h")]
    pub active_time: Timing,
    pub public: bool,
    pub servings: i32,
}

impl From<CreateRecipeRequest> for Recipe {
    fn from(request: CreateRecipeRequest) -> Self {
        Recipe {
            name: request.name,
            description: request.description,
            ingredients: request.ingredients.unwrap_or_default(),
            required_equipment: request.required_equipment.unwrap_or_default(),
            instructions: request.instructions.unwrap_or_default(),
            notes: request.notes,
            display_url: request.display_url,
            source_url: request.source_url,
            prep_time: request.prep_time,
            active_time: request.active_time,
            public: request.public,
            servings: request.servings,
            ..Default::default()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 422, description = "Invalid recipe", body = ValidationErrorResponse),
        (status = 503, description = "Database busy", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    request: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection),
    };

    let mut recipe = Recipe::from(request);
    if let Err(errors) = recipe.validate() {
        return failed_validation(errors);
    }

    let result = with_store(&state, move |store| {
        store.insert(&mut recipe)?;
        Ok(recipe)
    })
    .await;

    match result {
        Ok(recipe) => {
            let location = format!("/v1/recipes/{}", recipe.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(RecipeResponse { recipe }),
            )
                .into_response()
        }
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_request_defaults_and_durations() {
        let request: CreateRecipeRequest = serde_json::from_str(
            r#"{"name": "Toast", "prep_time": "5m", "ingredients": null}"#,
        )
        .unwrap();
        let recipe = Recipe::from(request);
        assert_eq!(recipe.name, "Toast");
        assert_eq!(recipe.prep_time.as_duration(), Duration::from_secs(300));
        assert!(recipe.active_time.is_zero());
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
        assert_eq!(recipe.version, 0);
    }

    #[test]
    fn test_numeric_duration_is_rejected() {
        let result: Result<CreateRecipeRequest, _> =
            serde_json::from_str(r#"{"name": "Toast", "prep_time": 300}"#);
        assert!(result.is_err());
    }
}
