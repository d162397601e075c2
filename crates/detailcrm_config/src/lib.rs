use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the layered application configuration.
///
/// Sources, later ones winning:
/// 1. built-in defaults
/// 2. `config/default.*` and `config/{RUN_ENV}.*` (both optional)
/// 3. `DETAILCRM__SECTION__KEY` environment variables
/// 4. the hosting platform's flat variables (see [`env_vars::PLATFORM_ENV_VARS`])
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());
    let prefix = env_vars::get_config_prefix();

    let mut builder = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 3000)?
        .set_default("environment", "development")?
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .prefix_separator(env_vars::CONFIG_SEPARATOR)
                .separator(env_vars::CONFIG_SEPARATOR),
        );

    for (path, value) in env_vars::resolve_platform_overrides(|name| env::var(name).ok()) {
        builder = builder.set_override(path, value)?;
    }

    let config: AppConfig = builder.build()?.try_deserialize()?;
    if config.supabase.url.trim().is_empty() {
        return Err(ConfigError::Message(
            "supabase.url is empty; set SUPABASE_URL or NEXT_PUBLIC_SUPABASE_URL".to_string(),
        ));
    }
    Ok(config)
}

/// Serializes the configuration with all secret values masked.
pub fn redacted_json(config: &AppConfig) -> serde_json::Value {
    let mut json = serde_json::to_value(config).unwrap_or(serde_json::Value::Null);
    env_vars::redact_secrets(&mut json);
    json
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, at most once.
///
/// `DOTENV_OVERRIDE` selects a different file than `.env`. Returns the path
/// that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
