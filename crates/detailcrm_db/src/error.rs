//! Error types for the database client

use detailcrm_common::CrmError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// A statement failed; carries the statement for the operator.
    #[error("Database query error in `{statement}`: {message}")]
    QueryError { statement: String, message: String },

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),
}

impl From<DbError> for CrmError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(msg) => CrmError::ConfigError(msg),
            other => CrmError::DatabaseError(other.to_string()),
        }
    }
}
