//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! All SQL in this module has been reviewed for SQL injection safety:
//! - User input is ALWAYS passed via `.bind()` parameters
//! - No string concatenation or interpolation with user data
//!
//! When adding new SQL here:
//! 1. Document why Diesel DSL can't be used
//! 2. Ensure all user input uses `.bind()`

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::query_builder::SqlQuery;
use diesel::sql_types::BigInt;

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
///
/// # Safety
/// Static SQL string with no user input.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// `SET LOCAL statement_timeout` for the current transaction.
///
/// # Safety
/// `SET` does not accept bind parameters, so the value is formatted in. It is
/// an integer millisecond count computed by the store, never user input.
pub fn set_local_statement_timeout(millis: u64) -> SqlQuery {
    diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}"))
}

/// Filter expression: the recipe uses an ingredient whose name matches any of
/// the given ILIKE patterns.
///
/// # Safety
/// The pattern array is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel has no `ILIKE ANY(array)` operator.
#[macro_export]
macro_rules! ingredient_name_matches_any {
    ($patterns:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "EXISTS (SELECT 1 FROM recipe_ingredients ri \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id = recipes.id AND i.name ILIKE ANY(",
        )
        .bind::<diesel::sql_types::Array<diesel::sql_types::Text>, _>($patterns)
        .sql("))")
    };
}

/// Filter expression: the recipe uses equipment whose name matches any of the
/// given ILIKE patterns.
///
/// # Safety
/// The pattern array is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel has no `ILIKE ANY(array)` operator.
#[macro_export]
macro_rules! equipment_name_matches_any {
    ($patterns:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "EXISTS (SELECT 1 FROM recipe_equipment re \
             JOIN equipment e ON e.id = re.equipment_id \
             WHERE re.recipe_id = recipes.id AND e.name ILIKE ANY(",
        )
        .bind::<diesel::sql_types::Array<diesel::sql_types::Text>, _>($patterns)
        .sql("))")
    };
}

/// Wraps `term` for a substring ILIKE, escaping LIKE metacharacters.
pub fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_term() {
        assert_eq!(contains_pattern("beef"), "%beef%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_contains_pattern_escapes_metacharacters() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_statement_timeout_sql() {
        let query = set_local_statement_timeout(3000);
        let rendered = diesel::debug_query::<diesel::pg::Pg, _>(&query).to_string();
        assert!(rendered.contains("SET LOCAL statement_timeout = 3000"));
    }
}
