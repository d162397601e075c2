//! Environment variable handling for detailcrm.
//!
//! Two naming schemes are recognized. Structured overrides use the
//! `DETAILCRM__SECTION__KEY` pattern and are picked up by the `config` crate.
//! The hosting platform additionally exports a fixed set of flat variables
//! (`SUPABASE_URL`, `NEXT_PUBLIC_APP_URL`, ...) which are mapped onto config
//! paths here and applied last.

use serde_json::Value;
use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "DETAILCRM";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// Config paths and the platform variables that feed them, in precedence order.
pub const PLATFORM_ENV_VARS: &[(&str, &[&str])] = &[
    ("supabase.url", &["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]),
    ("supabase.anon_key", &["NEXT_PUBLIC_SUPABASE_ANON_KEY"]),
    ("supabase.service_role_key", &["SUPABASE_SERVICE_ROLE_KEY"]),
    ("environment", &["VERCEL_ENV"]),
    ("app_url", &["NEXT_PUBLIC_APP_URL"]),
    ("database.password", &["DB_PASSWORD"]),
    ("oauth.state_secret", &["OAUTH_STATE_SECRET"]),
    ("oauth.google.client_id", &["GOOGLE_CLIENT_ID"]),
    ("oauth.google.client_secret", &["GOOGLE_CLIENT_SECRET"]),
    ("oauth.microsoft.client_id", &["MICROSOFT_CLIENT_ID"]),
    ("oauth.microsoft.client_secret", &["MICROSOFT_CLIENT_SECRET"]),
    ("oauth.microsoft.tenant", &["MICROSOFT_TENANT_ID"]),
];

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Resolve the platform variables into `(config path, value)` overrides.
///
/// The first non-empty variable listed for a path wins. `lookup` is usually
/// `|name| std::env::var(name).ok()`.
pub fn resolve_platform_overrides<F>(lookup: F) -> Vec<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    PLATFORM_ENV_VARS
        .iter()
        .filter_map(|(path, names)| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
                .map(|value| (*path, value))
        })
        .collect()
}

/// Check if a path is a secret path
///
/// Paths containing "secret", "key" or "password" are considered secret.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret") || path_lower.contains("key") || path_lower.contains("password")
}

/// Replace every secret string value with a fixed marker.
///
/// Used before configuration is logged. Returns `true` if anything was redacted.
pub fn redact_secrets(value: &mut Value) -> bool {
    fn walk(path: Vec<String>, obj: &mut Value) -> bool {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced |= walk(new_path, v);
                }
            }
            Value::String(s) if is_secret_path(&path.join(".")) => {
                *s = "***".to_string();
                replaced = true;
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value)
}
