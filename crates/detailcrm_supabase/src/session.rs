//! Session resolution for incoming requests.
//!
//! The access token is read, in order, from
//! 1. `Authorization: Bearer <token>`
//! 2. the `sb-access-token` cookie
//! 3. the Supabase SSR cookie `sb-<project-ref>-auth-token`, possibly split
//!    into `.0`, `.1`, ... chunks and possibly `base64-` prefixed, holding
//!    either a session object or the legacy `[access, refresh, ...]` array.
//!
//! The token is then validated against the auth service.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use cookie::Cookie;
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use serde_json::Value;
use tracing::{debug, error};

use crate::backend::Backend;
use crate::models::AuthUser;

pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

const AUTH_COOKIE_PREFIX: &str = "sb-";
const AUTH_COOKIE_SUFFIX: &str = "-auth-token";
const BASE64_PREFIX: &str = "base64-";

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Extract the caller's access token without validating it.
pub fn access_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    let cookies: Vec<Cookie<'static>> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| {
            Cookie::split_parse_encoded(header.to_string())
                .filter_map(Result::ok)
                .collect::<Vec<_>>()
        })
        .collect();

    if let Some(cookie) = cookies
        .iter()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE && !c.value().is_empty())
    {
        return Some(cookie.value().to_string());
    }

    token_from_auth_cookie_chunks(&cookies)
}

/// Reassemble a (possibly chunked) `sb-<ref>-auth-token` cookie and pull out the access token.
fn token_from_auth_cookie_chunks(cookies: &[Cookie<'_>]) -> Option<String> {
    let mut whole: Option<&str> = None;
    let mut chunks: Vec<(usize, &str)> = Vec::new();

    for cookie in cookies {
        let name = cookie.name();
        if !name.starts_with(AUTH_COOKIE_PREFIX) {
            continue;
        }
        if name.ends_with(AUTH_COOKIE_SUFFIX) {
            whole = Some(cookie.value());
        } else if let Some((base, index)) = name.rsplit_once('.') {
            if base.ends_with(AUTH_COOKIE_SUFFIX) {
                if let Ok(index) = index.parse::<usize>() {
                    chunks.push((index, cookie.value()));
                }
            }
        }
    }

    let raw = match whole {
        Some(value) => value.to_string(),
        None if !chunks.is_empty() => {
            chunks.sort_by_key(|(index, _)| *index);
            chunks.into_iter().map(|(_, v)| v).collect::<String>()
        }
        None => return None,
    };

    token_from_auth_cookie(&raw)
}

/// Decode the value of a Supabase SSR auth cookie.
pub fn token_from_auth_cookie(raw: &str) -> Option<String> {
    let json = match raw.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => {
            let bytes = URL_SAFE_NO_PAD
                .decode(encoded)
                .or_else(|_| URL_SAFE.decode(encoded))
                .or_else(|_| STANDARD.decode(encoded))
                .ok()?;
            String::from_utf8(bytes).ok()?
        }
        None => raw.to_string(),
    };

    let value: Value = serde_json::from_str(&json).ok()?;
    let token = match &value {
        Value::Object(map) => map.get("access_token").and_then(Value::as_str),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }?;
    (!token.is_empty()).then(|| token.to_string())
}

/// Resolve the caller's session.
///
/// Returns `None` when no token is present (no backend call is made), when the
/// auth service rejects the token, or when the auth service cannot be reached.
pub async fn resolve_session(backend: &dyn Backend, headers: &HeaderMap) -> Option<Session> {
    let access_token = access_token_from_headers(headers)?;
    match backend.get_user(&access_token).await {
        Ok(Some(user)) => Some(Session { user, access_token }),
        Ok(None) => {
            debug!("Request carried an invalid or expired access token");
            None
        }
        Err(e) => {
            error!("Failed to resolve session: {}", e);
            None
        }
    }
}
