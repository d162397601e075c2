// --- File: crates/detailcrm_admin/src/lib.rs ---
//! Shared logic for the administrative binaries.
//!
//! Each binary is a thin clap front end: it loads the configuration, starts
//! logging, and calls one of the functions here. `migrate_columns --dry-run`
//! skips the configuration and only prints the statements. They run once, sequentially,
//! against the hosted project.

use detailcrm_common::{validation_error, CrmError};
use detailcrm_config::{load_config, AppConfig};
use detailcrm_db::{apply_column_migrations, migration_statements, DbClient};
use tracing::Level;
use detailcrm_supabase::{AuthUser, BucketStatus, CreateUserRequest, NewBucket, SupabaseClient};
use serde_json::{json, Value};
use tracing::info;

pub const DEFAULT_BUCKET: &str = "job-photos";
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;
/// Supabase Auth rejects shorter passwords with its default policy.
pub const MIN_PASSWORD_LEN: usize = 6;

pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/heic",
];

/// Start logging without a configuration, for commands that never reach the project.
pub fn bootstrap_offline() {
    detailcrm_common::init_with_level(Level::INFO);
}

/// Load config and start logging at the level for the configured environment.
pub fn bootstrap() -> Result<AppConfig, CrmError> {
    let config = load_config().map_err(|e| CrmError::ConfigError(e.to_string()))?;
    detailcrm_common::init_with_level(detailcrm_common::level_for_environment(
        &config.environment,
    ));
    Ok(config)
}

pub fn new_user_request(
    email: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<CreateUserRequest, CrmError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(validation_error(format!("'{email}' is not an email address")));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(validation_error(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user_metadata = match full_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => json!({ "full_name": name }),
        None => Value::Null,
    };

    Ok(CreateUserRequest {
        email: email.to_string(),
        password: password.to_string(),
        email_confirm: true,
        user_metadata,
    })
}

/// Create a confirmed user through the admin API.
pub async fn create_user(
    client: &SupabaseClient,
    request: &CreateUserRequest,
) -> Result<AuthUser, CrmError> {
    info!("Creating user {}", request.email);
    let user = client.create_user(request).await?;
    info!("Created user {} ({})", request.email, user.id);
    Ok(user)
}

pub fn bucket_spec(name: &str, public: bool, max_size_mb: u64) -> Result<NewBucket, CrmError> {
    let file_size_limit = max_size_mb
        .checked_mul(1024 * 1024)
        .ok_or_else(|| validation_error(format!("max size of {max_size_mb} MB is too large")))?;
    Ok(NewBucket {
        id: name.to_string(),
        name: name.to_string(),
        public,
        file_size_limit: Some(file_size_limit),
        allowed_mime_types: Some(IMAGE_MIME_TYPES.iter().map(|m| m.to_string()).collect()),
    })
}

pub async fn setup_storage(
    client: &SupabaseClient,
    bucket: &NewBucket,
) -> Result<BucketStatus, CrmError> {
    let status = client.ensure_bucket(bucket).await?;
    match status {
        BucketStatus::Created => info!("Created storage bucket '{}'", bucket.id),
        BucketStatus::AlreadyExists => info!("Storage bucket '{}' already exists", bucket.id),
    }
    Ok(status)
}

/// The statements `migrate_columns` would run, without touching the database.
pub fn planned_migrations() -> Vec<String> {
    info!("Dry run: no statements will be executed");
    migration_statements()
}

/// Apply the column migrations and return the executed statements.
pub async fn migrate_columns(config: &AppConfig) -> Result<Vec<String>, CrmError> {
    let db = DbClient::new(config).await?;
    Ok(apply_column_migrations(&db).await?)
}
