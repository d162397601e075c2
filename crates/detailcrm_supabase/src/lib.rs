//! Supabase integration for detailcrm
//!
//! All persistence, querying, authentication and row-level security live in
//! the hosted Supabase project. This crate is the thin client the rest of the
//! workspace uses to reach it:
//!
//! - [`Backend`]: the trait handlers depend on
//! - [`SupabaseClient`]: the REST implementation, plus admin/storage calls
//! - [`TableQuery`]: PostgREST filter chaining
//! - [`session`]: access-token extraction and validation

pub mod backend;
pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::Backend;
pub use client::SupabaseClient;
pub use error::SupabaseError;
pub use models::{AuthUser, Bucket, BucketStatus, CreateUserRequest, NewBucket};
pub use query::TableQuery;
pub use session::{resolve_session, Session};
