//! The seam between request handlers and the hosted backend.
//!
//! Handlers only ever see `Arc<dyn Backend>`; production wires in
//! [`SupabaseClient`](crate::SupabaseClient), tests an in-memory fake.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SupabaseError;
use crate::models::AuthUser;
use crate::query::TableQuery;

/// Operations the application performs against the hosted backend.
///
/// Every data call carries the caller's access token so that row-level
/// security applies on the backend side.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve an access token to a user. `Ok(None)` means the token was rejected.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError>;

    async fn select(
        &self,
        access_token: &str,
        query: &TableQuery,
    ) -> Result<Vec<Value>, SupabaseError>;

    /// Insert one row and return the stored representation.
    async fn insert(
        &self,
        access_token: &str,
        table: &str,
        row: Value,
    ) -> Result<Vec<Value>, SupabaseError>;

    /// Delete every row matching the query's filters.
    async fn delete(&self, access_token: &str, query: &TableQuery) -> Result<(), SupabaseError>;
}
