use crate::api::{failed_validation, with_store, ErrorResponse, ValidationErrorResponse};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use eatinn_core::filters::DEFAULT_PAGE_SIZE;
use eatinn_core::{Filters, ListQuery, Metadata, RecipeSummary, Timing, ValidationErrors};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters are kept as text so bad numbers become field errors
/// rather than a blanket rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Case-insensitive substring of the recipe name
    pub name: Option<String>,
    /// Comma-separated ingredient substrings; any match qualifies
    pub ingredients: Option<String>,
    /// Comma-separated equipment substrings; any match qualifies
    pub required_equipment: Option<String>,
    /// Maximum prep time in minutes (0 = no limit)
    pub prep_time: Option<String>,
    /// Maximum active time in minutes (0 = no limit)
    pub active_time: Option<String>,
    /// Page number (default: 1)
    pub page: Option<String>,
    /// Page size (default: 20, max: 100)
    pub page_size: Option<String>,
    /// One of id, name, prep_time, active_time; prefix with - for descending (default: id)
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub metadata: Metadata,
}

fn read_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_int(value: Option<&str>, default: i64, field: &str, errors: &mut ValidationErrors) -> i64 {
    match value {
        None | Some("") => default,
        Some(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                errors.check(false, field, "must be an integer value");
                default
            }
        },
    }
}

fn read_minutes(value: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Timing {
    let minutes = read_int(value, 0, field, errors);
    errors.check(minutes >= 0, field, "must not be negative");
    let timing = u64::try_from(minutes)
        .ok()
        .and_then(Timing::checked_from_minutes);
    errors.check(
        minutes < 0 || timing.is_some(),
        field,
        &format!("must not be more than {}", Timing::MAX_MINUTES),
    );
    timing.unwrap_or(Timing::ZERO)
}

impl ListRecipesParams {
    pub fn into_query(self) -> Result<ListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let max_prep_time = read_minutes(self.prep_time.as_deref(), "prep_time", &mut errors);
        let max_active_time = read_minutes(self.active_time.as_deref(), "active_time", &mut errors);
        let filters = Filters {
            page: read_int(self.page.as_deref(), 1, "page", &mut errors),
            page_size: read_int(
                self.page_size.as_deref(),
                DEFAULT_PAGE_SIZE,
                "page_size",
                &mut errors,
            ),
            sort: self
                .sort
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "id".to_string()),
        };
        if let Err(filter_errors) = filters.validate() {
            for (field, message) in filter_errors.into_map() {
                errors.check(false, &field, &message);
            }
        }

        errors.into_result()?;
        Ok(ListQuery {
            name: self.name.unwrap_or_default(),
            ingredients: read_csv(self.ingredients.as_deref()),
            equipment: read_csv(self.required_equipment.as_deref()),
            max_prep_time,
            max_active_time,
            filters,
        })
    }
}

#[utoipa::path(
    get,
    path = "/v1/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Matching recipes", body = ListRecipesResponse),
        (status = 422, description = "Invalid parameters", body = ValidationErrorResponse),
        (status = 503, description = "Database busy", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let query = match params.into_query() {
        Ok(query) => query,
        Err(errors) => return failed_validation(errors),
    };

    match with_store(&state, move |store| store.get_all(&query)).await {
        Ok((recipes, metadata)) => {
            (StatusCode::OK, Json(ListRecipesResponse { recipes, metadata })).into_response()
        }
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListRecipesParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Query::<ListRecipesParams>::try_from_uri(
            &format!("/v1/recipes?{query}").parse().unwrap(),
        )
        .unwrap()
        .0
    }

    #[test]
    fn test_defaults() {
        let query = params(&[]).into_query().unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn test_csv_and_minutes() {
        let query = params(&[
            ("name", "stew"),
            ("ingredients", "beef, carrot,,"),
            ("required_equipment", "pot"),
            ("prep_time", "30"),
            ("page", "2"),
            ("page_size", "10"),
            ("sort", "-name"),
        ])
        .into_query()
        .unwrap();

        assert_eq!(query.name, "stew");
        assert_eq!(query.ingredients, vec!["beef", "carrot"]);
        assert_eq!(query.equipment, vec!["pot"]);
        assert_eq!(query.max_prep_time, Timing::from_minutes(30));
        assert!(query.max_active_time.is_zero());
        assert_eq!(query.filters.page, 2);
        assert_eq!(query.filters.page_size, 10);
        assert_eq!(query.filters.sort, "-name");
    }

    #[test]
    fn test_invalid_parameters_are_field_errors() {
        let errors = params(&[
            ("page", "two"),
            ("page_size", "500"),
            ("sort", "servings"),
            ("active_time", "-5"),
        ])
        .into_query()
        .unwrap_err();

        assert_eq!(errors.get("page"), Some("must be an integer value"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));
        assert_eq!(errors.get("sort"), Some("invalid sort value"));
        assert_eq!(errors.get("active_time"), Some("must not be negative"));
    }

    #[test]
    fn test_oversized_minutes_are_field_errors() {
        let errors = params(&[
            ("prep_time", "9223372036854775807"),
            ("active_time", "153722868"),
        ])
        .into_query()
        .unwrap_err();

        assert_eq!(errors.get("prep_time"), Some("must not be more than 153722867"));
        assert_eq!(errors.get("active_time"), Some("must not be more than 153722867"));

        let query = params(&[("prep_time", "153722867")]).into_query().unwrap();
        assert_eq!(query.max_prep_time, Timing::from_minutes(Timing::MAX_MINUTES));
    }
}
