//! Recipe persistence: the transactional writer, the aggregate reader and the
//! filtered lister, sharing one connection pool.
//!
//! Every operation runs inside a single transaction bounded by the store's
//! operation timeout. Pool checkout is bounded by the pool's own connection
//! timeout, each transaction sets a local `statement_timeout` to whatever is
//! left of the budget, and the writer re-checks the deadline between child
//! rows. A failure at any point rolls the whole transaction back.

mod lister;
mod reader;
pub mod references;
mod writer;

use crate::db::DbPool;
use crate::raw_sql;
use diesel::prelude::*;
use diesel::r2d2::PoolError;
use diesel::result::Error as DieselError;
use eatinn_core::{ListQuery, Metadata, Recipe, RecipeSummary};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum StoreError {
    /// The id is not positive or no row has it.
    #[error("record not found")]
    NotFound,

    /// The update matched no row: either the recipe is gone or its version moved on.
    #[error("edit conflict")]
    EditConflict,

    #[error("operation timed out")]
    Timeout,

    #[error("database connection failed: {0}")]
    Pool(#[from] PoolError),

    #[error("database error: {0}")]
    Database(DieselError),
}

impl StoreError {
    /// Worth retrying as-is after a short wait.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout | StoreError::Pool(_))
    }
}

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        if is_statement_timeout(&error) {
            StoreError::Timeout
        } else {
            StoreError::Database(error)
        }
    }
}

fn is_statement_timeout(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(_, info) if info.message().contains("statement timeout")
    )
}

/// Point in time by which an operation must finish.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Instant,
}

impl Deadline {
    pub(crate) fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    /// Remaining budget in whole milliseconds (at least 1), or `Timeout` once spent.
    pub(crate) fn remaining_millis(&self) -> Result<u64, StoreError> {
        let remaining = self.at.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(StoreError::Timeout);
        }
        Ok(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX).max(1))
    }

    pub(crate) fn check(&self) -> Result<(), StoreError> {
        self.remaining_millis().map(|_| ())
    }
}

fn bound_statements(conn: &mut PgConnection, deadline: &Deadline) -> Result<(), StoreError> {
    let millis = deadline.remaining_millis()?;
    raw_sql::set_local_statement_timeout(millis).execute(conn)?;
    Ok(())
}

/// The recipe persistence engine.
#[derive(Clone)]
pub struct RecipeStore {
    pool: DbPool,
    timeout: Duration,
}

impl RecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut PgConnection, &Deadline) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let deadline = Deadline::after(self.timeout);
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction(|conn| {
            bound_statements(conn, &deadline)?;
            f(conn, &deadline)
        })
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&mut PgConnection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let deadline = Deadline::after(self.timeout);
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.build_transaction().read_only().run(|conn| {
            bound_statements(conn, &deadline)?;
            f(conn)
        })
    }

    /// Inserts a new aggregate and fills in its `id`, `created_at` and `version`.
    pub fn insert(&self, recipe: &mut Recipe) -> Result<(), StoreError> {
        let inserted = self.write(|conn, deadline| writer::insert_recipe(conn, recipe, deadline))?;
        recipe.id = inserted.id;
        recipe.created_at = inserted.created_at;
        recipe.version = inserted.version;
        tracing::info!(recipe_id = recipe.id, "recipe created");
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Recipe, StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        self.read(|conn| reader::load_recipe(conn, id))
    }

    /// Replaces the stored aggregate with `recipe`, provided `recipe.version`
    /// still matches. On success `recipe.version` holds the new version.
    pub fn update(&self, recipe: &mut Recipe) -> Result<(), StoreError> {
        let expected = recipe.version;
        let version = self.write(|conn, deadline| writer::update_recipe(conn, recipe, deadline));
        match version {
            Ok(version) => {
                recipe.version = version;
                tracing::info!(recipe_id = recipe.id, version, "recipe updated");
                Ok(())
            }
            Err(StoreError::EditConflict) => {
                tracing::debug!(
                    recipe_id = recipe.id,
                    expected_version = expected,
                    "update lost optimistic lock"
                );
                Err(StoreError::EditConflict)
            }
            Err(e) => Err(e),
        }
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        self.write(|conn, _| writer::delete_recipe(conn, id))?;
        tracing::info!(recipe_id = id, "recipe deleted");
        Ok(())
    }

    pub fn get_all(&self, query: &ListQuery) -> Result<(Vec<RecipeSummary>, Metadata), StoreError> {
        self.read(|conn| lister::list_recipes(conn, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::r2d2::{self, ConnectionManager};

    /// A store whose pool never connects; any query attempt fails fast.
    fn unreachable_store() -> RecipeStore {
        let manager = ConnectionManager::<PgConnection>::new("postgres://nobody@127.0.0.1:1/none");
        let pool = r2d2::Pool::builder()
            .min_idle(Some(0))
            .connection_timeout(Duration::from_millis(200))
            .build_unchecked(manager);
        RecipeStore::new(pool)
    }

    #[test]
    fn test_get_rejects_non_positive_ids_without_querying() {
        let store = unreachable_store();
        assert!(matches!(store.get(0), Err(StoreError::NotFound)));
        assert!(matches!(store.get(-1), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_delete_rejects_non_positive_ids_without_querying() {
        let store = unreachable_store();
        assert!(matches!(store.delete(0), Err(StoreError::NotFound)));
        assert!(matches!(store.delete(-42), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_positive_id_reaches_the_pool() {
        let store = unreachable_store();
        let err = store.get(1).unwrap_err();
        assert!(matches!(err, StoreError::Pool(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_spent_deadline_times_out() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(matches!(deadline.check(), Err(StoreError::Timeout)));

        let deadline = Deadline::after(Duration::from_secs(3));
        let millis = deadline.remaining_millis().unwrap();
        assert!(millis > 0 && millis <= 3000);
    }
}
