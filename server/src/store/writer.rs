use super::references::ReferenceResolver;
use super::{Deadline, StoreError};
use crate::models::{
    NewImage, NewInstruction, NewInstructionImage, NewRecipeEquipment, NewRecipeIngredient,
    RecipeFields,
};
use crate::schema::{
    recipe_equipment, recipe_images, recipe_ingredients, recipe_instruction_images,
    recipe_instructions, recipes,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use eatinn_core::{ImageType, Recipe};
use std::collections::HashSet;

/// Store-assigned values of a freshly inserted recipe.
#[derive(Queryable, Debug)]
pub(super) struct Inserted {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

pub(super) fn insert_recipe(
    conn: &mut PgConnection,
    recipe: &Recipe,
    deadline: &Deadline,
) -> Result<Inserted, StoreError> {
    let inserted: Inserted = diesel::insert_into(recipes::table)
        .values(RecipeFields::from(recipe))
        .returning((recipes::id, recipes::created_at, recipes::version))
        .get_result(conn)?;

    write_children(conn, inserted.id, recipe, deadline)?;
    Ok(inserted)
}

/// Bumps the version if it still matches, then rebuilds every child row.
pub(super) fn update_recipe(
    conn: &mut PgConnection,
    recipe: &Recipe,
    deadline: &Deadline,
) -> Result<i32, StoreError> {
    let new_version: Option<i32> = diesel::update(
        recipes::table
            .filter(recipes::id.eq(recipe.id))
            .filter(recipes::version.eq(recipe.version)),
    )
    .set((
        RecipeFields::from(recipe),
        recipes::version.eq(recipes::version + 1),
    ))
    .returning(recipes::version)
    .get_result(conn)
    .optional()?;

    let Some(new_version) = new_version else {
        return Err(StoreError::EditConflict);
    };

    clear_children(conn, recipe.id)?;
    write_children(conn, recipe.id, recipe, deadline)?;
    Ok(new_version)
}

pub(super) fn delete_recipe(conn: &mut PgConnection, id: i64) -> Result<(), StoreError> {
    let deleted = diesel::delete(recipes::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Removes everything `write_children` creates. Instruction-image links go
/// with their instructions; thumbnails are left alone.
fn clear_children(conn: &mut PgConnection, recipe_id: i64) -> QueryResult<()> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    diesel::delete(recipe_equipment::table.filter(recipe_equipment::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    diesel::delete(recipe_instructions::table.filter(recipe_instructions::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    diesel::delete(
        recipe_images::table
            .filter(recipe_images::recipe_id.eq(recipe_id))
            .filter(
                recipe_images::image_type
                    .eq_any([ImageType::Main.as_str(), ImageType::Step.as_str()]),
            ),
    )
    .execute(conn)?;
    Ok(())
}

fn write_children(
    conn: &mut PgConnection,
    recipe_id: i64,
    recipe: &Recipe,
    deadline: &Deadline,
) -> Result<(), StoreError> {
    let mut references = ReferenceResolver::new();

    for entry in &recipe.ingredients {
        deadline.check()?;
        let ingredient_id = references.ingredient_id(conn, &entry.ingredient)?;
        diesel::insert_into(recipe_ingredients::table)
            .values(NewRecipeIngredient {
                recipe_id,
                ingredient_id,
                quantity: &entry.amount,
                unit: &entry.unit,
                optional: entry.optional,
            })
            .execute(conn)?;
    }

    // Equipment is a set: repeated names link once.
    let mut linked = HashSet::new();
    for name in &recipe.required_equipment {
        deadline.check()?;
        let equipment_id = references.equipment_id(conn, name)?;
        if linked.insert(equipment_id) {
            diesel::insert_into(recipe_equipment::table)
                .values(NewRecipeEquipment {
                    recipe_id,
                    equipment_id,
                })
                .execute(conn)?;
        }
    }

    for step in &recipe.instructions {
        deadline.check()?;
        let instruction_id: i64 = diesel::insert_into(recipe_instructions::table)
            .values(NewInstruction::new(recipe_id, step))
            .returning(recipe_instructions::id)
            .get_result(conn)?;

        for url in &step.image_urls {
            let image_id = insert_image(conn, recipe_id, url, ImageType::Step)?;
            diesel::insert_into(recipe_instruction_images::table)
                .values(NewInstructionImage {
                    instruction_id,
                    image_id,
                })
                .execute(conn)?;
        }
    }

    if !recipe.display_url.is_empty() {
        insert_image(conn, recipe_id, &recipe.display_url, ImageType::Main)?;
    }

    Ok(())
}

fn insert_image(
    conn: &mut PgConnection,
    recipe_id: i64,
    url: &str,
    image_type: ImageType,
) -> QueryResult<i64> {
    diesel::insert_into(recipe_images::table)
        .values(NewImage {
            recipe_id,
            image_url: url,
            image_type: image_type.as_str(),
        })
        .returning(recipe_images::id)
        .get_result(conn)
}
