use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the data-access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("User {0} no longer exists")]
    UserGone(i64),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// The error every lookup returns when its result set is empty.
    pub fn empty_list() -> Self {
        DatabaseError::NotFound("empty list".to_string())
    }

    /// Maps a unique-constraint violation onto `Conflict`, passing other errors through.
    pub fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(message.into())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }

    /// Maps a broken `user_id` foreign key onto `UserGone`. A session cookie
    /// can outlive the account it names.
    pub fn user_gone_on_fk(err: sqlx::Error, user_id: i64) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.is_foreign_key_violation()
                    && db.constraint().is_some_and(|c| c.ends_with("user_id_fkey")) =>
            {
                DatabaseError::UserGone(user_id)
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Owns construction and upkeep of the shared connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Build the pool without opening a connection; the first query connects.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = Self::pool_options(config).connect_lazy(&config.url)?;
        info!("Created lazy database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Build the pool and open a first connection right away
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Apply the embedded migrations in `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_connections: 2,
            connection_timeout: 1,
            run_migrations: false,
        }
    }

    #[tokio::test]
    async fn lazy_pool_requires_url() {
        let err = DatabaseManager::connect_lazy(&config("  ")).unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        // Nothing listens on port 1; building the pool must still succeed.
        let pool = DatabaseManager::connect_lazy(&config("postgres://nobody@127.0.0.1:1/none"));
        assert!(pool.is_ok());
    }

    #[test]
    fn empty_list_is_not_found() {
        assert!(matches!(DatabaseError::empty_list(), DatabaseError::NotFound(msg) if msg == "empty list"));
    }

    #[test]
    fn non_database_errors_are_not_conflicts() {
        let err = DatabaseError::conflict_on_unique(sqlx::Error::RowNotFound, "taken");
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn only_foreign_key_errors_mean_user_gone() {
        let err = DatabaseError::user_gone_on_fk(sqlx::Error::RowNotFound, 3);
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
