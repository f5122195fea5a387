//! Deduplicating resolver for ingredient and equipment names.
//!
//! Reference rows are shared between recipes and keyed by a unique name.
//! Resolving a name inserts it when absent and returns the row id either way,
//! as one atomic statement, so concurrent writers converge on the same row.

use crate::schema::{equipment, ingredients};
use diesel::prelude::*;
use diesel::upsert::excluded;
use std::collections::HashMap;

pub fn upsert_ingredient(conn: &mut PgConnection, name: &str) -> QueryResult<i64> {
    diesel::insert_into(ingredients::table)
        .values(ingredients::name.eq(name))
        .on_conflict(ingredients::name)
        .do_update()
        .set(ingredients::name.eq(excluded(ingredients::name)))
        .returning(ingredients::id)
        .get_result(conn)
}

pub fn upsert_equipment(conn: &mut PgConnection, name: &str) -> QueryResult<i64> {
    diesel::insert_into(equipment::table)
        .values(equipment::name.eq(name))
        .on_conflict(equipment::name)
        .do_update()
        .set(equipment::name.eq(excluded(equipment::name)))
        .returning(equipment::id)
        .get_result(conn)
}

/// Resolves names for a single write, asking the database once per distinct name.
///
/// Ids are only valid inside the transaction that produced them, so a resolver
/// must not outlive its write.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    ingredients: HashMap<String, i64>,
    equipment: HashMap<String, i64>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingredient_id(&mut self, conn: &mut PgConnection, name: &str) -> QueryResult<i64> {
        if let Some(id) = self.ingredients.get(name) {
            return Ok(*id);
        }
        let id = upsert_ingredient(conn, name)?;
        self.ingredients.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn equipment_id(&mut self, conn: &mut PgConnection, name: &str) -> QueryResult<i64> {
        if let Some(id) = self.equipment.get(name) {
            return Ok(*id);
        }
        let id = upsert_equipment(conn, name)?;
        self.equipment.insert(name.to_string(), id);
        Ok(id)
    }
}
