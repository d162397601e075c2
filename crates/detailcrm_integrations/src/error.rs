// --- File: crates/detailcrm_integrations/src/error.rs ---
use detailcrm_supabase::SupabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    /// Client id/secret or signing key missing
    #[error("OAuth configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to encode OAuth URL: {0}")]
    UrlError(#[from] serde_urlencoded::ser::Error),

    /// `state` failed signature, user, provider or age checks
    #[error("Invalid OAuth state: {0}")]
    InvalidState(String),

    /// The provider redirected back with `?error=`
    #[error("Authorization denied by provider: {0}")]
    Denied(String),

    #[error("Token request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Token endpoint returned an error: {message} (Status: {status_code})")]
    TokenError { status_code: u16, message: String },

    #[error(transparent)]
    Backend(#[from] SupabaseError),
}
