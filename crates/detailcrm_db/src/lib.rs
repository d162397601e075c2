//! Direct Postgres access for detailcrm
//!
//! Request handlers never touch the database directly; everything goes
//! through the Supabase REST surface. This crate exists for schema
//! maintenance only: it opens a pooled connection to the hosted project's
//! Postgres instance and applies idempotent column migrations.

pub mod client;
pub mod error;
pub mod migrations;

pub use client::DbClient;
pub use error::DbError;
pub use migrations::{apply_column_migrations, migration_statements, ColumnMigration};
