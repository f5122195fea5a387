use crate::telemetry;
use diesel::connection::InstrumentationEvent;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to create database pool: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("failed to run database migrations: {0}")]
    Migration(String),
}

/// Sizing and lifetime limits for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// Idle connections are closed after this long. `None` keeps them forever.
    pub idle_timeout: Option<Duration>,
    /// How long a checkout may wait for a free connection.
    pub connection_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 25,
            idle_timeout: Some(Duration::from_secs(15 * 60)),
            connection_timeout: Duration::from_secs(3),
        }
    }
}

/// Logs every statement under the `db.query` target and counts it against
/// the current request.
#[derive(Debug, Clone, Copy)]
struct QueryLogging;

fn log_query(event: InstrumentationEvent<'_>) {
    match event {
        InstrumentationEvent::StartQuery { query, .. } => {
            telemetry::record_db_query();
            tracing::debug!(target: "db.query", statement = %query, "executing query");
        }
        InstrumentationEvent::FinishQuery {
            query,
            error: Some(error),
            ..
        } => {
            tracing::debug!(target: "db.query", statement = %query, error = %error, "query failed");
        }
        _ => {}
    }
}

impl CustomizeConnection<PgConnection, r2d2::Error> for QueryLogging {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        conn.set_instrumentation(log_query);
        Ok(())
    }
}

pub fn create_pool(database_url: &str, settings: &PoolSettings) -> Result<DbPool, DbError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(settings.max_connections)
        .idle_timeout(settings.idle_timeout)
        .connection_timeout(settings.connection_timeout)
        .connection_customizer(Box::new(QueryLogging))
        .build(manager)?;

    run_migrations(&pool)?;
    Ok(pool)
}

/// Applies any pending migrations on a pooled connection.
pub fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;
    for version in &applied {
        tracing::info!(%version, "applied migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_connections, 25);
        assert_eq!(settings.idle_timeout, Some(Duration::from_secs(900)));
        assert_eq!(settings.connection_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_pool_creation_fails_without_database() {
        let settings = PoolSettings {
            connection_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let result = create_pool("postgres://nobody@127.0.0.1:1/none", &settings);
        assert!(matches!(result, Err(DbError::Pool(_))));
    }
}
