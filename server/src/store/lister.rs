use super::StoreError;
use crate::models::{timing_to_interval, SummaryRow};
use crate::raw_sql::{contains_pattern, count_over};
use crate::schema::{recipe_images, recipes};
use crate::{equipment_name_matches_any, ingredient_name_matches_any};
use diesel::dsl::count_star;
use diesel::pg::data_types::PgInterval;
use diesel::prelude::*;
use eatinn_core::{Direction, ImageType, ListQuery, Metadata, RecipeSummary, SortColumn};

/// Bind values for a listing, owned so the boxed queries can borrow nothing.
#[derive(Debug, Default)]
struct ListingParams {
    name: Option<String>,
    ingredients: Vec<String>,
    equipment: Vec<String>,
    max_prep_time: Option<PgInterval>,
    max_active_time: Option<PgInterval>,
}

impl ListingParams {
    fn from_query(query: &ListQuery) -> Self {
        let patterns = |terms: &[String]| -> Vec<String> {
            terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(contains_pattern)
                .collect()
        };
        Self {
            name: (!query.name.is_empty()).then(|| contains_pattern(&query.name)),
            ingredients: patterns(&query.ingredients),
            equipment: patterns(&query.equipment),
            max_prep_time: timing_to_interval(query.max_prep_time),
            max_active_time: timing_to_interval(query.max_active_time),
        }
    }
}

/// Applies every active filter to a boxed query rooted at `recipes`.
macro_rules! filtered_listing {
    ($query:expr, $params:expr) => {{
        let params: &ListingParams = $params;
        let mut query = $query;
        if let Some(ref pattern) = params.name {
            query = query.filter(recipes::name.ilike(pattern.clone()));
        }
        if let Some(max) = params.max_prep_time {
            query = query.filter(recipes::prep_time.le(max));
        }
        if let Some(max) = params.max_active_time {
            query = query.filter(recipes::active_time.le(max));
        }
        if !params.ingredients.is_empty() {
            query = query.filter(ingredient_name_matches_any!(params.ingredients.clone()));
        }
        if !params.equipment.is_empty() {
            query = query.filter(equipment_name_matches_any!(params.equipment.clone()));
        }
        query
    }};
}

pub(super) fn list_recipes(
    conn: &mut PgConnection,
    query: &ListQuery,
) -> Result<(Vec<RecipeSummary>, Metadata), StoreError> {
    let params = ListingParams::from_query(query);
    let filters = &query.filters;

    let listing = filtered_listing!(
        recipes::table
            .left_join(
                recipe_images::table.on(recipe_images::recipe_id
                    .eq(recipes::id)
                    .and(recipe_images::image_type.eq(ImageType::Main.as_str()))),
            )
            .into_boxed(),
        &params
    );

    let listing = match filters.sort_order() {
        (SortColumn::Id, Direction::Asc) => listing.order(recipes::id.asc()),
        (SortColumn::Id, Direction::Desc) => listing.order(recipes::id.desc()),
        (SortColumn::Name, Direction::Asc) => listing.order(recipes::name.asc()),
        (SortColumn::Name, Direction::Desc) => listing.order(recipes::name.desc()),
        (SortColumn::PrepTime, Direction::Asc) => listing.order(recipes::prep_time.asc()),
        (SortColumn::PrepTime, Direction::Desc) => listing.order(recipes::prep_time.desc()),
        (SortColumn::ActiveTime, Direction::Asc) => listing.order(recipes::active_time.asc()),
        (SortColumn::ActiveTime, Direction::Desc) => listing.order(recipes::active_time.desc()),
    }
    .then_order_by(recipes::id.asc());

    let rows: Vec<SummaryRow> = listing
        .select((
            count_over(),
            recipes::id,
            recipes::created_at,
            recipes::name,
            recipes::description,
            recipes::prep_time,
            recipes::active_time,
            recipes::servings,
            recipes::public,
            recipes::version,
            recipe_images::image_url.nullable(),
        ))
        .limit(filters.limit())
        .offset(filters.offset())
        .load(conn)?;

    let total = match rows.first() {
        Some(row) => row.total_count,
        None if filters.offset() > 0 => {
            // Past the last page the window count has no row to ride on.
            filtered_listing!(recipes::table.into_boxed(), &params)
                .select(count_star())
                .get_result::<i64>(conn)?
        }
        None => 0,
    };

    tracing::debug!(
        total,
        returned = rows.len(),
        page = filters.page,
        "listed recipes"
    );

    let metadata = Metadata::calculate(total, filters.page, filters.page_size);
    Ok((rows.into_iter().map(RecipeSummary::from).collect(), metadata))
}
