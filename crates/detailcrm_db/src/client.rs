//! Postgres client for schema maintenance.
//!
//! Connects straight to the hosted project's database
//! (`db.<project-ref>.supabase.co:5432`) with the `DB_PASSWORD` credential.

use crate::error::DbError;
use detailcrm_config::AppConfig;
use sqlx::pool::PoolOptions;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database transaction
pub type DbTransaction<'a> = Transaction<'a, Postgres>;

const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    /// Connect using the database section of the configuration.
    ///
    /// # Errors
    ///
    /// * no host can be derived (neither `database.host` nor a Supabase project ref)
    /// * `DB_PASSWORD` is not set
    /// * the connection fails
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        Self::with_timeout(config, DEFAULT_ACQUIRE_TIMEOUT).await
    }

    pub async fn with_timeout(config: &AppConfig, timeout: Duration) -> Result<Self, DbError> {
        let options = connect_options(config)?;
        debug!(
            "Connecting to Postgres at {}:{}",
            options.get_host(),
            options.get_port()
        );

        let pool = PoolOptions::<Postgres>::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                DbError::SqlxError(e)
            })?;

        info!("Database connection established");
        Ok(Self { pool })
    }

    pub async fn begin(&self) -> Result<DbTransaction<'_>, DbError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))
    }
}

/// Build connection options from config; hosted projects require TLS.
pub fn connect_options(config: &AppConfig) -> Result<PgConnectOptions, DbError> {
    let db = &config.database;
    let host = db.resolved_host(&config.supabase).ok_or_else(|| {
        DbError::ConfigError(
            "Cannot derive database host: set database.host or a Supabase URL".to_string(),
        )
    })?;
    let password = db
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| DbError::ConfigError("DB_PASSWORD is not set".to_string()))?;

    Ok(PgConnectOptions::new()
        .host(&host)
        .port(db.port)
        .username(&db.user)
        .password(password)
        .database(&db.name)
        .ssl_mode(PgSslMode::Require))
}

#[cfg(test)]
mod tests {
    use super::*;
    use detailcrm_config::{DatabaseConfig, SupabaseConfig};

    fn config(password: Option<&str>) -> AppConfig {
        let mut config = AppConfig::for_supabase(SupabaseConfig {
            url: "https://abcd1234.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
        });
        config.database = DatabaseConfig {
            password: password.map(str::to_string),
            ..DatabaseConfig::default()
        };
        config
    }

    #[test]
    fn test_connect_options_from_project_ref() {
        let options = connect_options(&config(Some("pw"))).unwrap();
        assert_eq!(options.get_host(), "db.abcd1234.supabase.co");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "postgres");
        assert_eq!(options.get_database(), Some("postgres"));
    }

    #[test]
    fn test_missing_password_is_config_error() {
        for password in [None, Some("")] {
            let err = connect_options(&config(password)).unwrap_err();
            assert!(matches!(err, DbError::ConfigError(ref m) if m.contains("DB_PASSWORD")));
        }
    }
}
