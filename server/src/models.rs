use crate::schema::{
    recipe_equipment, recipe_images, recipe_ingredients, recipe_instruction_images,
    recipe_instructions, recipes,
};
use chrono::{DateTime, Utc};
use diesel::pg::data_types::PgInterval;
use diesel::prelude::*;
use eatinn_core::{IngredientEntry, Recipe, RecipeSummary, Timing};
use std::time::Duration;

const MICROS_PER_DAY: i64 = 86_400_000_000;
const DAYS_PER_MONTH: i64 = 30;

/// Zero timings are stored as NULL.
pub fn timing_to_interval(timing: Timing) -> Option<PgInterval> {
    if timing.is_zero() {
        return None;
    }
    let micros = i64::try_from(timing.as_duration().as_micros()).unwrap_or(i64::MAX);
    Some(PgInterval::from_microseconds(micros))
}

/// NULL reads back as zero. Negative intervals clamp to zero.
pub fn interval_to_timing(interval: Option<PgInterval>) -> Timing {
    let Some(interval) = interval else {
        return Timing::ZERO;
    };
    let micros = i64::from(interval.months)
        .saturating_mul(DAYS_PER_MONTH * MICROS_PER_DAY)
        .saturating_add(i64::from(interval.days).saturating_mul(MICROS_PER_DAY))
        .saturating_add(interval.microseconds);
    Timing::from_duration(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn non_zero(servings: i32) -> Option<i32> {
    (servings != 0).then_some(servings)
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub source_url: Option<String>,
    pub prep_time: Option<PgInterval>,
    pub active_time: Option<PgInterval>,
    pub servings: Option<i32>,
    pub public: bool,
    pub user_id: Option<i64>,
    pub version: i32,
}

impl RecipeRow {
    /// The recipe's scalar fields; collections are left empty for the caller to fill.
    pub fn into_recipe(self) -> Recipe {
        Recipe {
            id: self.id,
            created_at: self.created_at,
            name: self.name,
            description: self.description.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            source_url: self.source_url.unwrap_or_default(),
            prep_time: interval_to_timing(self.prep_time),
            active_time: interval_to_timing(self.active_time),
            servings: self.servings.unwrap_or_default(),
            public: self.public,
            user_id: self.user_id,
            version: self.version,
            ..Default::default()
        }
    }
}

/// Writable recipe columns, shared by insert and update.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeFields<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub source_url: Option<&'a str>,
    pub prep_time: Option<PgInterval>,
    pub active_time: Option<PgInterval>,
    pub servings: Option<i32>,
    pub public: bool,
    pub user_id: Option<i64>,
}

impl<'a> From<&'a Recipe> for RecipeFields<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        Self {
            name: &recipe.name,
            description: non_empty(&recipe.description),
            notes: non_empty(&recipe.notes),
            source_url: non_empty(&recipe.source_url),
            prep_time: timing_to_interval(recipe.prep_time),
            active_time: timing_to_interval(recipe.active_time),
            servings: non_zero(recipe.servings),
            public: recipe.public,
            user_id: recipe.user_id,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub struct NewRecipeIngredient<'a> {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: &'a str,
    pub unit: &'a str,
    pub optional: bool,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_equipment)]
pub struct NewRecipeEquipment {
    pub recipe_id: i64,
    pub equipment_id: i64,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_instructions)]
pub struct NewInstruction<'a> {
    pub recipe_id: i64,
    pub step_number: i32,
    pub instruction: &'a str,
    pub notes: Option<&'a str>,
}

impl<'a> NewInstruction<'a> {
    pub fn new(recipe_id: i64, step: &'a eatinn_core::InstructionStep) -> Self {
        Self {
            recipe_id,
            step_number: step.step_number,
            instruction: &step.text,
            notes: non_empty(&step.notes),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = recipe_images)]
pub struct NewImage<'a> {
    pub recipe_id: i64,
    pub image_url: &'a str,
    pub image_type: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_instruction_images)]
pub struct NewInstructionImage {
    pub instruction_id: i64,
    pub image_id: i64,
}

/// An ingredient line joined with its reference name.
#[derive(Queryable, Debug)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub optional: bool,
}

impl From<IngredientLine> for IngredientEntry {
    fn from(line: IngredientLine) -> Self {
        IngredientEntry {
            ingredient: line.name,
            amount: line.quantity,
            unit: line.unit,
            optional: line.optional,
        }
    }
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = recipe_instructions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InstructionRow {
    pub id: i64,
    pub step_number: i32,
    pub instruction: String,
    pub notes: Option<String>,
}

/// One listing row, with the window count of all matching recipes.
#[derive(Queryable, Debug)]
pub struct SummaryRow {
    pub total_count: i64,
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub prep_time: Option<PgInterval>,
    pub active_time: Option<PgInterval>,
    pub servings: Option<i32>,
    pub public: bool,
    pub version: i32,
    pub display_url: Option<String>,
}

impl From<SummaryRow> for RecipeSummary {
    fn from(row: SummaryRow) -> Self {
        RecipeSummary {
            id: row.id,
            created_at: row.created_at,
            name: row.name,
            description: row.description.unwrap_or_default(),
            display_url: row.display_url.unwrap_or_default(),
            prep_time: interval_to_timing(row.prep_time),
            active_time: interval_to_timing(row.active_time),
            public: row.public,
            servings: row.servings.unwrap_or_default(),
            version: row.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timing_is_stored_as_null() {
        assert!(timing_to_interval(Timing::ZERO).is_none());
        assert_eq!(interval_to_timing(None), Timing::ZERO);
    }

    #[test]
    fn test_timing_interval_round_trip() {
        let timing = Timing::from_minutes(90);
        let interval = timing_to_interval(timing).unwrap();
        assert_eq!(interval.microseconds, 90 * 60 * 1_000_000);
        assert_eq!(interval.days, 0);
        assert_eq!(interval.months, 0);
        assert_eq!(interval_to_timing(Some(interval)), timing);
    }

    #[test]
    fn test_interval_with_days_and_months() {
        let interval = PgInterval::new(1_000_000, 1, 1);
        let expected = Timing::from_secs(31 * 86_400 + 1);
        assert_eq!(interval_to_timing(Some(interval)), expected);
    }

    #[test]
    fn test_negative_interval_clamps_to_zero() {
        let interval = PgInterval::from_microseconds(-5_000_000);
        assert_eq!(interval_to_timing(Some(interval)), Timing::ZERO);
    }

    #[test]
    fn test_recipe_fields_map_empty_values_to_null() {
        let recipe = Recipe {
            name: "Toast".to_string(),
            ..Default::default()
        };
        let fields = RecipeFields::from(&recipe);
        assert_eq!(fields.name, "Toast");
        assert!(fields.description.is_none());
        assert!(fields.source_url.is_none());
        assert!(fields.prep_time.is_none());
        assert!(fields.servings.is_none());
    }
}
