// --- File: crates/detailcrm_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod routes; // Route definitions

pub use routes::routes;

pub use error::{unauthorized, validation_error, CrmError, HttpStatusCode};

pub use http::{
    client::{create_client, HTTP_CLIENT},
    error_response, IntoHttpResponse,
};

pub use logging::{init_with_level, level_for_environment};
