// File: crates/detailcrm_integrations/src/handlers.rs
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::Utc;
use detailcrm_common::{error_response, unauthorized};
use detailcrm_config::AppConfig;
use detailcrm_supabase::{resolve_session, Backend, Session, TableQuery};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::OAuthError;
use crate::oauth::{authorization_url, exchange_code, integration_row};
use crate::providers::Provider;
use crate::state::{sign_state, verify_state};

#[derive(Clone)]
pub struct IntegrationsState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn Backend>,
    pub http: reqwest::Client,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub success: bool,
}

/// Optional body of the disconnect routes.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    /// Row id; integer ids are accepted and kept as their decimal string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub integration_id: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!(
            "integrationId must be a string or a number, got {other}"
        ))),
    }
}

impl DisconnectRequest {
    /// An empty body or `null` means no `integrationId`; anything else must parse.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice::<Option<Self>>(body)?.unwrap_or_default())
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub const INVALID_DISCONNECT_BODY: &str = "Invalid request body";

/// Key for the signed `state`; falls back to the service-role key.
fn state_secret(config: &AppConfig) -> Result<&str, OAuthError> {
    config
        .oauth
        .state_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| {
            config
                .supabase
                .service_role_key
                .as_deref()
                .filter(|s| !s.is_empty())
        })
        .ok_or_else(|| OAuthError::ConfigError("OAUTH_STATE_SECRET is not set".to_string()))
}

fn settings_redirect(config: &AppConfig, provider: Provider, connected: bool) -> Redirect {
    let status = if connected { "connected" } else { "error" };
    Redirect::to(&format!(
        "{}/settings?integration={}&status={}",
        config.app_url(),
        provider.slug(),
        status
    ))
}

async fn require_session(state: &IntegrationsState, headers: &HeaderMap) -> Option<Session> {
    resolve_session(state.backend.as_ref(), headers).await
}

async fn initiate(state: &IntegrationsState, headers: &HeaderMap, provider: Provider) -> Response {
    let Some(session) = require_session(state, headers).await else {
        return unauthorized().into_response();
    };

    let auth_url = state_secret(&state.config)
        .and_then(|secret| {
            sign_state(secret, provider, session.user_id(), Utc::now().timestamp())
        })
        .and_then(|signed| authorization_url(&state.config, provider, &signed));

    match auth_url {
        Ok(auth_url) => {
            info!(
                "Issued {} consent URL for user {}",
                provider.display_name(),
                session.user_id()
            );
            Json(AuthUrlResponse { auth_url }).into_response()
        }
        Err(e) => {
            error!("Error initiating {} OAuth: {}", provider.display_name(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, provider.initiate_error())
        }
    }
}

/// Delete the caller's rows for `provider`, optionally narrowed to one integration id.
pub fn disconnect_query(
    provider: Provider,
    user_id: &str,
    integration_id: Option<&str>,
) -> TableQuery {
    let mut query = TableQuery::from(provider.table()).eq("user_id", user_id);
    if let Some(email_provider) = provider.email_provider() {
        query = query.eq("provider", email_provider);
    }
    // Google Calendar disconnect always clears every row for the user.
    if provider != Provider::GoogleCalendar {
        if let Some(id) = integration_id.filter(|id| !id.is_empty()) {
            query = query.eq("id", id);
        }
    }
    query
}

async fn disconnect(
    state: &IntegrationsState,
    headers: &HeaderMap,
    provider: Provider,
    body: &[u8],
) -> Response {
    let Some(session) = require_session(state, headers).await else {
        return unauthorized().into_response();
    };

    let request = match DisconnectRequest::from_body(body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected {} disconnect body: {}", provider.display_name(), e);
            return error_response(StatusCode::BAD_REQUEST, INVALID_DISCONNECT_BODY);
        }
    };
    let query = disconnect_query(
        provider,
        session.user_id(),
        request.integration_id.as_deref(),
    );

    match state.backend.delete(&session.access_token, &query).await {
        Ok(()) => {
            info!(
                "Disconnected {} for user {}",
                provider.display_name(),
                session.user_id()
            );
            Json(DisconnectResponse { success: true }).into_response()
        }
        Err(e) => {
            error!("Error disconnecting {}: {}", provider.display_name(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, provider.disconnect_error())
        }
    }
}

async fn complete_connection(
    state: &IntegrationsState,
    session: &Session,
    provider: Provider,
    query: CallbackQuery,
) -> Result<(), OAuthError> {
    if let Some(denied) = query.error {
        return Err(OAuthError::Denied(
            query.error_description.unwrap_or(denied),
        ));
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| OAuthError::InvalidState("missing authorization code".to_string()))?;
    let signed = query
        .state
        .ok_or_else(|| OAuthError::InvalidState("missing state".to_string()))?;

    let now = Utc::now();
    verify_state(
        state_secret(&state.config)?,
        provider,
        session.user_id(),
        &signed,
        now.timestamp(),
    )?;

    let tokens = exchange_code(&state.http, &state.config, provider, &code).await?;
    let row = integration_row(provider, session.user_id(), &tokens, now);
    state
        .backend
        .insert(&session.access_token, provider.table(), row)
        .await?;
    Ok(())
}

async fn callback(
    state: &IntegrationsState,
    headers: &HeaderMap,
    provider: Provider,
    query: CallbackQuery,
) -> Response {
    let Some(session) = require_session(state, headers).await else {
        return Redirect::to("/login").into_response();
    };

    match complete_connection(state, &session, provider, query).await {
        Ok(()) => {
            info!(
                "Connected {} for user {}",
                provider.display_name(),
                session.user_id()
            );
            settings_redirect(&state.config, provider, true).into_response()
        }
        Err(e @ (OAuthError::InvalidState(_) | OAuthError::Denied(_))) => {
            warn!("{} callback rejected: {}", provider.display_name(), e);
            settings_redirect(&state.config, provider, false).into_response()
        }
        Err(e) => {
            error!("Error completing {} OAuth: {}", provider.display_name(), e);
            settings_redirect(&state.config, provider, false).into_response()
        }
    }
}

// --- Google Calendar ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/auth/google/initiate",
    responses(
        (status = 200, description = "Consent URL", body = AuthUrlResponse),
        (status = 401, description = "No session"),
        (status = 500, description = "Could not build the consent URL")
    ),
    tag = "Integrations"
))]
pub async fn google_initiate_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
) -> Response {
    initiate(&state, &headers, Provider::GoogleCalendar).await
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/auth/google/disconnect",
    responses(
        (status = 200, description = "All Google Calendar rows removed", body = DisconnectResponse),
        (status = 400, description = "Body is not valid JSON or integrationId has the wrong type"),
        (status = 401, description = "No session"),
        (status = 500, description = "Delete failed")
    ),
    tag = "Integrations"
))]
pub async fn google_disconnect_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    disconnect(&state, &headers, Provider::GoogleCalendar, &body).await
}

pub async fn google_callback_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    callback(&state, &headers, Provider::GoogleCalendar, query).await
}

// --- Gmail ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/integrations/gmail/auth",
    responses(
        (status = 200, description = "Consent URL", body = AuthUrlResponse),
        (status = 401, description = "No session"),
        (status = 500, description = "Could not build the consent URL")
    ),
    tag = "Integrations"
))]
pub async fn gmail_auth_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
) -> Response {
    initiate(&state, &headers, Provider::Gmail).await
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/integrations/gmail/disconnect",
    request_body(content = DisconnectRequest, description = "Optional integration id"),
    responses(
        (status = 200, description = "Rows removed", body = DisconnectResponse),
        (status = 400, description = "Body is not valid JSON or integrationId has the wrong type"),
        (status = 401, description = "No session"),
        (status = 500, description = "Delete failed")
    ),
    tag = "Integrations"
))]
pub async fn gmail_disconnect_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    disconnect(&state, &headers, Provider::Gmail, &body).await
}

pub async fn gmail_callback_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    callback(&state, &headers, Provider::Gmail, query).await
}

// --- Google Business Profile ---

// Gated on a session like the other providers: the callback binds the stored
// row to the session user, and the signed state covers the user id.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/integrations/gmb/auth",
    responses(
        (status = 200, description = "Consent URL", body = AuthUrlResponse),
        (status = 401, description = "No session"),
        (status = 500, description = "Could not build the consent URL")
    ),
    tag = "Integrations"
))]
pub async fn gmb_auth_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
) -> Response {
    initiate(&state, &headers, Provider::Gmb).await
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/integrations/gmb/disconnect",
    request_body(content = DisconnectRequest, description = "Optional integration id"),
    responses(
        (status = 200, description = "Rows removed", body = DisconnectResponse),
        (status = 400, description = "Body is not valid JSON or integrationId has the wrong type"),
        (status = 401, description = "No session"),
        (status = 500, description = "Delete failed")
    ),
    tag = "Integrations"
))]
pub async fn gmb_disconnect_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    disconnect(&state, &headers, Provider::Gmb, &body).await
}

pub async fn gmb_callback_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    callback(&state, &headers, Provider::Gmb, query).await
}

// --- Outlook ---

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/integrations/outlook/auth",
    responses(
        (status = 200, description = "Consent URL", body = AuthUrlResponse),
        (status = 401, description = "No session"),
        (status = 500, description = "Could not build the consent URL")
    ),
    tag = "Integrations"
))]
pub async fn outlook_auth_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
) -> Response {
    initiate(&state, &headers, Provider::Outlook).await
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/integrations/outlook/disconnect",
    request_body(content = DisconnectRequest, description = "Optional integration id"),
    responses(
        (status = 200, description = "Rows removed", body = DisconnectResponse),
        (status = 400, description = "Body is not valid JSON or integrationId has the wrong type"),
        (status = 401, description = "No session"),
        (status = 500, description = "Delete failed")
    ),
    tag = "Integrations"
))]
pub async fn outlook_disconnect_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    disconnect(&state, &headers, Provider::Outlook, &body).await
}

pub async fn outlook_callback_handler(
    State(state): State<Arc<IntegrationsState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    callback(&state, &headers, Provider::Outlook, query).await
}
