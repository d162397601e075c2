// --- File: crates/detailcrm_integrations/src/oauth.rs ---
//
// Consent URL construction and the authorization-code exchange.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use detailcrm_config::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::OAuthError;
use crate::providers::Provider;

/// Calendar rows are bound to the account's primary calendar.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }
}

struct ClientCredentials<'a> {
    client_id: &'a str,
    client_secret: Option<&'a str>,
}

fn credentials(config: &AppConfig, provider: Provider) -> Result<ClientCredentials<'_>, OAuthError> {
    let (client_id, client_secret, var) = if provider.is_google() {
        let google = &config.oauth.google;
        (
            google.client_id.as_deref(),
            google.client_secret.as_deref(),
            "GOOGLE_CLIENT_ID",
        )
    } else {
        let microsoft = &config.oauth.microsoft;
        (
            microsoft.client_id.as_deref(),
            microsoft.client_secret.as_deref(),
            "MICROSOFT_CLIENT_ID",
        )
    };
    let client_id = client_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| OAuthError::ConfigError(format!("{var} is not set")))?;
    Ok(ClientCredentials {
        client_id,
        client_secret: client_secret.filter(|s| !s.is_empty()),
    })
}

pub fn redirect_uri(config: &AppConfig, provider: Provider) -> String {
    format!("{}{}", config.app_url(), provider.callback_path())
}

fn google_auth_url(config: &AppConfig, provider: Provider, state: &str) -> Result<String, OAuthError> {
    let creds = credentials(config, provider)?;
    let redirect_uri = redirect_uri(config, provider);
    let scope = provider.scopes().join(" ");
    let query = serde_urlencoded::to_string([
        ("client_id", creds.client_id),
        ("redirect_uri", redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
        ("access_type", "offline"),
        ("prompt", "consent"),
        ("include_granted_scopes", "true"),
        ("state", state),
    ])?;
    Ok(format!("{}?{}", config.oauth.google.authorize_url, query))
}

/// Consent URL for Google Calendar.
pub fn google_calendar_auth_url(config: &AppConfig, state: &str) -> Result<String, OAuthError> {
    google_auth_url(config, Provider::GoogleCalendar, state)
}

pub fn gmail_auth_url(config: &AppConfig, state: &str) -> Result<String, OAuthError> {
    google_auth_url(config, Provider::Gmail, state)
}

pub fn gmb_auth_url(config: &AppConfig, state: &str) -> Result<String, OAuthError> {
    google_auth_url(config, Provider::Gmb, state)
}

pub fn outlook_auth_url(config: &AppConfig, state: &str) -> Result<String, OAuthError> {
    let creds = credentials(config, Provider::Outlook)?;
    let redirect_uri = redirect_uri(config, Provider::Outlook);
    let scope = Provider::Outlook.scopes().join(" ");
    let query = serde_urlencoded::to_string([
        ("client_id", creds.client_id),
        ("response_type", "code"),
        ("redirect_uri", redirect_uri.as_str()),
        ("response_mode", "query"),
        ("scope", scope.as_str()),
        ("state", state),
    ])?;
    Ok(format!("{}?{}", config.oauth.microsoft.authorize_url(), query))
}

pub fn authorization_url(
    config: &AppConfig,
    provider: Provider,
    state: &str,
) -> Result<String, OAuthError> {
    match provider {
        Provider::GoogleCalendar => google_calendar_auth_url(config, state),
        Provider::Gmail => gmail_auth_url(config, state),
        Provider::Gmb => gmb_auth_url(config, state),
        Provider::Outlook => outlook_auth_url(config, state),
    }
}

fn token_url(config: &AppConfig, provider: Provider) -> String {
    if provider.is_google() {
        config.oauth.google.token_url.clone()
    } else {
        config.oauth.microsoft.token_url()
    }
}

/// Exchange an authorization code at the provider's token endpoint.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &AppConfig,
    provider: Provider,
    code: &str,
) -> Result<TokenResponse, OAuthError> {
    let creds = credentials(config, provider)?;
    let client_secret = creds.client_secret.ok_or_else(|| {
        OAuthError::ConfigError(format!("{} client secret is not set", provider.display_name()))
    })?;
    let redirect_uri = redirect_uri(config, provider);
    let scope = provider.scopes().join(" ");

    let mut params = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri.as_str()),
        ("client_id", creds.client_id),
        ("client_secret", client_secret),
    ];
    if provider == Provider::Outlook {
        params.push(("scope", scope.as_str()));
    }

    let response = http
        .post(token_url(config, provider))
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error_description")
                    .or_else(|| v.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(body);
        error!(
            "{} token exchange failed with {}: {}",
            provider.display_name(),
            status,
            message
        );
        return Err(OAuthError::TokenError {
            status_code: status.as_u16(),
            message,
        });
    }

    let tokens = response.json::<TokenResponse>().await?;
    info!("{} token exchange succeeded", provider.display_name());
    Ok(tokens)
}

/// Row inserted into the provider's integration table.
pub fn integration_row(
    provider: Provider,
    user_id: &str,
    tokens: &TokenResponse,
    now: DateTime<Utc>,
) -> Value {
    let mut row = json!({
        "user_id": user_id,
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
        "expires_at": tokens
            .expires_at(now)
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
    });
    if let Some(fields) = row.as_object_mut() {
        match provider {
            Provider::GoogleCalendar => {
                fields.insert("calendar_id".into(), json!(PRIMARY_CALENDAR_ID));
            }
            Provider::Gmail | Provider::Outlook => {
                fields.insert("provider".into(), json!(provider.email_provider()));
            }
            Provider::Gmb => {}
        }
    }
    row
}
