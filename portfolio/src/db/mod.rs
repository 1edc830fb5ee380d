//! Database connection pooling, schema migrations, and store traits.

pub mod config;
pub mod migrations;
pub mod store;

pub use config::DatabaseConfig;
pub use store::{ContactStore, CredentialStore, PgContactStore, PgCredentialStore};

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Owned handle to the Postgres connection pool.
///
/// Cloning the inner [`PgPool`] is cheap; the stores each hold their own
/// clone while this handle retains shutdown responsibility.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connects a pool using the given configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use portfolio::db::{Database, DatabaseConfig};
    ///
    /// # async fn run() -> Result<(), sqlx::Error> {
    /// let config = DatabaseConfig::from_env();
    /// let db = Database::new(&config).await?;
    /// db.health_check().await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`sqlx::Error`] when the pool cannot reach the database.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for constructing stores.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs a trivial query to confirm the database is reachable.
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool, waiting for in-flight connections to finish.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
