use super::StoreError;
use crate::models::{IngredientLine, InstructionRow, RecipeRow};
use crate::schema::{
    equipment, ingredients, recipe_equipment, recipe_images, recipe_ingredients,
    recipe_instruction_images, recipe_instructions, recipes,
};
use diesel::prelude::*;
use eatinn_core::{ImageType, IngredientEntry, InstructionStep, Recipe};
use std::collections::HashMap;

/// Reassembles the full aggregate for `id`. Each child query may come back
/// empty; only a missing recipe row is an error.
pub(super) fn load_recipe(conn: &mut PgConnection, id: i64) -> Result<Recipe, StoreError> {
    let row: RecipeRow = recipes::table
        .find(id)
        .select(RecipeRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound)?;
    let mut recipe = row.into_recipe();

    recipe.ingredients = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(id))
        .order((ingredients::name.asc(), recipe_ingredients::id.asc()))
        .select((
            ingredients::name,
            recipe_ingredients::quantity,
            recipe_ingredients::unit,
            recipe_ingredients::optional,
        ))
        .load::<IngredientLine>(conn)?
        .into_iter()
        .map(IngredientEntry::from)
        .collect();

    recipe.required_equipment = recipe_equipment::table
        .inner_join(equipment::table)
        .filter(recipe_equipment::recipe_id.eq(id))
        .order(equipment::name.asc())
        .select(equipment::name)
        .load(conn)?;

    recipe.instructions = load_instructions(conn, id)?;

    recipe.display_url = recipe_images::table
        .filter(recipe_images::recipe_id.eq(id))
        .filter(recipe_images::image_type.eq(ImageType::Main.as_str()))
        .order(recipe_images::id.asc())
        .select(recipe_images::image_url)
        .first::<String>(conn)
        .optional()?
        .unwrap_or_default();

    Ok(recipe)
}

/// Steps in step-number order, each with its images in insertion order.
fn load_instructions(conn: &mut PgConnection, recipe_id: i64) -> QueryResult<Vec<InstructionStep>> {
    let rows: Vec<InstructionRow> = recipe_instructions::table
        .filter(recipe_instructions::recipe_id.eq(recipe_id))
        .order(recipe_instructions::step_number.asc())
        .select(InstructionRow::as_select())
        .load(conn)?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let step_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let links: Vec<(i64, String)> = recipe_instruction_images::table
        .inner_join(recipe_images::table)
        .filter(recipe_instruction_images::instruction_id.eq_any(&step_ids))
        .order(recipe_images::id.asc())
        .select((
            recipe_instruction_images::instruction_id,
            recipe_images::image_url,
        ))
        .load(conn)?;

    let mut images: HashMap<i64, Vec<String>> = HashMap::new();
    for (instruction_id, url) in links {
        images.entry(instruction_id).or_default().push(url);
    }

    Ok(rows
        .into_iter()
        .map(|row| InstructionStep {
            step_number: row.step_number,
            text: row.instruction,
            notes: row.notes.unwrap_or_default(),
            image_urls: images.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}
