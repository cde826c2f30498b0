use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence gateway
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Missing association: {0}")]
    MissingAssociation(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation(db_err.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds the connection pool and owns schema migration.
///
/// The pool is created once in `main` (or per test) and cloned into every
/// component that needs it; there is no process-wide handle.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for the configured URL.
    ///
    /// In-memory databases live exactly as long as their connection, so they
    /// get a single connection that is never reaped.
    pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.url.clone()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.connection_timeout));

        pool_options = if Self::is_in_memory(&config.url) {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        info!("Opened database pool for: {}", config.url);
        Ok(pool)
    }

    /// Apply embedded migrations
    pub async fn migrate(pool: &SqlitePool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Connect and migrate in one step
    pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
        let pool = Self::connect(config).await?;
        Self::migrate(&pool).await?;
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
