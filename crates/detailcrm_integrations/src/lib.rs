// --- File: crates/detailcrm_integrations/src/lib.rs ---
pub mod doc;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod providers;
pub mod routes;
pub mod state;

pub use error::OAuthError;
pub use handlers::IntegrationsState;
pub use providers::Provider;
pub use routes::routes;
