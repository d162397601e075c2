// --- File: crates/detailcrm_config/src/models.rs ---

use serde::{Deserialize, Serialize};

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const MICROSOFT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Supabase Config ---
// URL and anon key are public; the service-role key is only needed by the admin commands.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupabaseConfig {
    pub url: String,      // SUPABASE_URL, falls back to NEXT_PUBLIC_SUPABASE_URL
    pub anon_key: String, // NEXT_PUBLIC_SUPABASE_ANON_KEY
    #[serde(default)]
    pub service_role_key: Option<String>, // SUPABASE_SERVICE_ROLE_KEY
}

impl SupabaseConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// The project reference, i.e. the first host label of `https://<ref>.supabase.co`.
    ///
    /// Returns `None` for self-hosted or local instances.
    pub fn project_ref(&self) -> Option<String> {
        let without_scheme = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        let host = without_scheme
            .split(['/', ':'])
            .next()
            .unwrap_or_default();
        let project_ref = host.strip_suffix(".supabase.co")?;
        if project_ref.is_empty() || project_ref.contains('.') {
            return None;
        }
        Some(project_ref.to_string())
    }
}

// --- Database Config ---
// Direct Postgres access, used by the column migration command only.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub host: Option<String>, // defaults to db.<project-ref>.supabase.co
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_name")]
    pub user: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default)]
    pub password: Option<String>, // DB_PASSWORD
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "postgres".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_db_port(),
            user: default_db_name(),
            name: default_db_name(),
            password: None,
        }
    }
}

impl DatabaseConfig {
    /// Explicit host if configured, otherwise the hosted Supabase database host.
    pub fn resolved_host(&self, supabase: &SupabaseConfig) -> Option<String> {
        self.host
            .clone()
            .filter(|h| !h.is_empty())
            .or_else(|| supabase.project_ref().map(|r| format!("db.{r}.supabase.co")))
    }
}

// --- OAuth Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleOAuthConfig {
    #[serde(default)]
    pub client_id: Option<String>, // GOOGLE_CLIENT_ID
    #[serde(default)]
    pub client_secret: Option<String>, // GOOGLE_CLIENT_SECRET
    #[serde(default = "default_google_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
}

fn default_google_authorize_url() -> String {
    GOOGLE_AUTHORIZE_URL.to_string()
}

fn default_google_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            authorize_url: default_google_authorize_url(),
            token_url: default_google_token_url(),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MicrosoftOAuthConfig {
    #[serde(default)]
    pub client_id: Option<String>, // MICROSOFT_CLIENT_ID
    #[serde(default)]
    pub client_secret: Option<String>, // MICROSOFT_CLIENT_SECRET
    #[serde(default = "default_tenant")]
    pub tenant: String, // MICROSOFT_TENANT_ID
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
}

fn default_tenant() -> String {
    "common".to_string()
}

fn default_authority_url() -> String {
    MICROSOFT_AUTHORITY_URL.to_string()
}

impl Default for MicrosoftOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            tenant: default_tenant(),
            authority_url: default_authority_url(),
        }
    }
}

impl MicrosoftOAuthConfig {
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/authorize",
            self.authority_url.trim_end_matches('/'),
            self.tenant
        )
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url.trim_end_matches('/'),
            self.tenant
        )
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OAuthConfig {
    #[serde(default)]
    pub state_secret: Option<String>, // OAUTH_STATE_SECRET
    #[serde(default)]
    pub google: GoogleOAuthConfig,
    #[serde(default)]
    pub microsoft: MicrosoftOAuthConfig,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,

    /// Deployment environment as reported by the hosting platform (VERCEL_ENV).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Public origin of the application (NEXT_PUBLIC_APP_URL).
    #[serde(default)]
    pub app_url: Option<String>,

    pub supabase: SupabaseConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub oauth: OAuthConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl AppConfig {
    /// Defaults for everything except the Supabase project.
    pub fn for_supabase(supabase: SupabaseConfig) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            environment: default_environment(),
            app_url: None,
            supabase,
            database: DatabaseConfig::default(),
            oauth: OAuthConfig::default(),
        }
    }

    /// Origin used to build OAuth redirect URIs and post-connect redirects.
    pub fn app_url(&self) -> String {
        match self.app_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.server.host, self.server.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supabase(url: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
        }
    }

    #[test]
    fn test_project_ref_from_hosted_url() {
        assert_eq!(
            supabase("https://abcdefgh.supabase.co").project_ref(),
            Some("abcdefgh".to_string())
        );
        assert_eq!(
            supabase("https://abcdefgh.supabase.co/").project_ref(),
            Some("abcdefgh".to_string())
        );
    }

    #[test]
    fn test_project_ref_absent_for_self_hosted() {
        assert_eq!(supabase("http://localhost:54321").project_ref(), None);
        assert_eq!(supabase("https://db.example.com").project_ref(), None);
    }

    #[test]
    fn test_database_host_resolution() {
        let db = DatabaseConfig::default();
        assert_eq!(
            db.resolved_host(&supabase("https://xyz.supabase.co")),
            Some("db.xyz.supabase.co".to_string())
        );

        let explicit = DatabaseConfig {
            host: Some("127.0.0.1".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(
            explicit.resolved_host(&supabase("https://xyz.supabase.co")),
            Some("127.0.0.1".to_string())
        );
        assert_eq!(db.resolved_host(&supabase("http://localhost:54321")), None);
    }

    #[test]
    fn test_app_url_fallback() {
        let mut config = AppConfig::for_supabase(supabase("https://xyz.supabase.co"));
        assert_eq!(config.app_url(), "http://127.0.0.1:3000");

        config.app_url = Some("https://crm.example.com/".to_string());
        assert_eq!(config.app_url(), "https://crm.example.com");
    }

    #[test]
    fn test_microsoft_endpoints_include_tenant() {
        let ms = MicrosoftOAuthConfig::default();
        assert_eq!(
            ms.authorize_url(),
            "https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
        );
        assert_eq!(
            ms.token_url(),
            "https://login.microsoftonline.com/common/oauth2/v2.0/token"
        );
    }
}
