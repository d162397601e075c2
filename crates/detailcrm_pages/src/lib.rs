// --- File: crates/detailcrm_pages/src/lib.rs ---
//! Authenticated page loaders: dashboard, board, calendar, analytics,
//! metrics, reviews and settings. Each page returns its props as JSON.
pub mod analytics;
#[cfg(test)]
mod analytics_test;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod queries;
pub mod routes;

pub use handlers::{PagesState, LOGIN_PATH};
pub use routes::routes;
