pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use eatinn_core::Recipe;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Returns the router for /v1/recipes endpoints (mounted at /v1/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
}

/// A single recipe wrapped in its envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub recipe: Recipe,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        RecipeResponse,
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        list::ListRecipesResponse,
        delete::DeleteRecipeResponse,
    ))
)]
pub struct ApiDoc;
