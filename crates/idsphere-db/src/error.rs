//! Database error type.

use thiserror::Error;

/// Result alias for store operations.
pub type DbResult<T> = Result<T, DbError>;

/// Failures surfaced by the stores.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying sqlx failure.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failure at startup.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
