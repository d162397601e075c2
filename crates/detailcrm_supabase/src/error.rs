// --- File: crates/detailcrm_supabase/src/error.rs ---
use detailcrm_common::CrmError;
use thiserror::Error;

/// Errors from the hosted Supabase backend.
#[derive(Error, Debug)]
pub enum SupabaseError {
    /// Transport failure talking to Supabase
    #[error("Supabase request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-success status from a Supabase endpoint
    #[error("Supabase returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// A row or response body could not be decoded
    #[error("Failed to decode Supabase response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A required key is not configured
    #[error("Supabase configuration missing: {0}")]
    ConfigError(String),
}

impl SupabaseError {
    /// Build an `ApiError` from a status and a raw response body.
    ///
    /// Supabase services disagree on the error field name, so the first of
    /// `message`, `msg`, `error_description`, `error` found in a JSON body is used.
    pub fn from_response(status_code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "msg", "error_description", "error"]
                    .iter()
                    .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| body.trim().to_string());
        SupabaseError::ApiError {
            status_code,
            message,
        }
    }
}

impl From<SupabaseError> for CrmError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::RequestError(e) => {
                CrmError::HttpError(format!("Supabase request error: {}", e))
            }
            SupabaseError::ApiError {
                status_code,
                message,
            } => CrmError::DatabaseError(format!("Status: {}, Message: {}", status_code, message)),
            SupabaseError::ParseError(e) => {
                CrmError::ParseError(format!("Supabase response parse error: {}", e))
            }
            SupabaseError::ConfigError(msg) => CrmError::ConfigError(msg),
        }
    }
}
