use sqlx::Error as SqlxError;
use thiserror::Error;

use crate::service::StockError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    ForeignKey(String),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        if matches!(err, SqlxError::RowNotFound) {
            return RepositoryError::NotFound;
        }
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return RepositoryError::AlreadyExists(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::ForeignKey(db_err.message().to_string());
            }
        }
        RepositoryError::Sqlx(err)
    }
}

impl RepositoryError {
    /// Replaces the driver's unique-violation text with one fit for a client.
    pub fn or_already_exists(self, message: &str) -> Self {
        match self {
            RepositoryError::AlreadyExists(_) => RepositoryError::AlreadyExists(message.to_string()),
            other => other,
        }
    }
}
