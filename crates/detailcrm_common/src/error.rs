// --- File: crates/detailcrm_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by all detailcrm crates.
///
/// Each crate keeps its own error enum and implements `From<ItsError> for CrmError`
/// so handlers can render any failure the same way.
#[derive(Error, Debug)]
pub enum CrmError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No session, or the session was rejected
    #[error("{0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error reported by the hosted database
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CrmError {
    fn status_code(&self) -> u16 {
        match self {
            CrmError::HttpError(_) => 500,
            CrmError::ParseError(_) => 400,
            CrmError::ConfigError(_) => 500,
            CrmError::AuthError(_) => 401,
            CrmError::ValidationError(_) => 400,
            CrmError::DatabaseError(_) => 500,
            CrmError::ExternalServiceError { .. } => 502,
            CrmError::NotFoundError(_) => 404,
            CrmError::InternalError(_) => 500,
        }
    }
}

pub fn unauthorized() -> CrmError {
    CrmError::AuthError("Unauthorized".to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> CrmError {
    CrmError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(unauthorized().status_code(), 401);
        assert_eq!(CrmError::ConfigError("missing".into()).status_code(), 500);
        assert_eq!(CrmError::DatabaseError("boom".into()).status_code(), 500);
        assert_eq!(
            CrmError::ExternalServiceError {
                service_name: "Google".into(),
                message: "down".into()
            }
            .status_code(),
            502
        );
        assert_eq!(validation_error("bad").status_code(), 400);
    }

    #[test]
    fn test_auth_error_message_is_bare() {
        assert_eq!(unauthorized().to_string(), "Unauthorized");
    }
}
