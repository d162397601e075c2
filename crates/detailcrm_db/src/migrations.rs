//! Idempotent column additions for schema drift on the hosted database.
//!
//! Every statement is `ALTER TABLE .. ADD COLUMN IF NOT EXISTS`, so running the
//! list twice is a no-op. All statements run in a single transaction.

use crate::client::DbClient;
use crate::error::DbError;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMigration {
    pub table: &'static str,
    pub column: &'static str,
    /// Type plus constraints, e.g. `INTEGER NOT NULL DEFAULT 0`.
    pub definition: &'static str,
}

impl ColumnMigration {
    pub const fn new(table: &'static str, column: &'static str, definition: &'static str) -> Self {
        Self {
            table,
            column,
            definition,
        }
    }

    pub fn to_sql(&self) -> String {
        format!(
            "ALTER TABLE public.{} ADD COLUMN IF NOT EXISTS \"{}\" {}",
            self.table, self.column, self.definition
        )
    }
}

pub const COLUMN_MIGRATIONS: &[ColumnMigration] = &[
    ColumnMigration::new("add_ons", "type", "TEXT NOT NULL DEFAULT 'standard'"),
    ColumnMigration::new("add_ons", "display_order", "INTEGER NOT NULL DEFAULT 0"),
    ColumnMigration::new("services", "display_order", "INTEGER NOT NULL DEFAULT 0"),
    ColumnMigration::new(
        "service_categories",
        "display_order",
        "INTEGER NOT NULL DEFAULT 0",
    ),
    ColumnMigration::new(
        "pipeline_stages",
        "is_archived",
        "BOOLEAN NOT NULL DEFAULT false",
    ),
    ColumnMigration::new("pipeline_stages", "kind", "TEXT NOT NULL DEFAULT 'job'"),
    ColumnMigration::new(
        "clients",
        "pipeline_stage_id",
        "UUID REFERENCES public.pipeline_stages(id) ON DELETE SET NULL",
    ),
];

pub fn migration_statements() -> Vec<String> {
    COLUMN_MIGRATIONS.iter().map(ColumnMigration::to_sql).collect()
}

/// Apply every column migration; returns the statements that were executed.
pub async fn apply_column_migrations(db: &DbClient) -> Result<Vec<String>, DbError> {
    let statements = migration_statements();
    let mut tx = db.begin().await?;

    for statement in &statements {
        info!("Applying: {}", statement);
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Migration statement failed: {}", e);
                DbError::QueryError {
                    statement: statement.clone(),
                    message: e.to_string(),
                }
            })?;
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionError(e.to_string()))?;
    info!("Applied {} column migrations", statements.len());
    Ok(statements)
}
