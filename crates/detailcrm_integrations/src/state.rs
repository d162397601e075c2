// --- File: crates/detailcrm_integrations/src/state.rs ---
//
// OAuth `state` parameter: `<nonce>.<issued_at>.<hex hmac>`, where the MAC covers
// `provider:user_id:issued_at:nonce`. The user id is not carried in the state; the
// callback recomputes the MAC with the session user, so a state issued to one
// user cannot complete a flow for another.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::OAuthError;
use crate::providers::Provider;

type HmacSha256 = Hmac<Sha256>;

pub const STATE_TTL_SECS: i64 = 600;
const CLOCK_SKEW_SECS: i64 = 60;

fn mac_for(
    secret: &str,
    provider: Provider,
    user_id: &str,
    issued_at: i64,
    nonce: &str,
) -> Result<HmacSha256, OAuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| OAuthError::ConfigError("Invalid OAuth state secret".to_string()))?;
    mac.update(format!("{}:{}:{}:{}", provider.slug(), user_id, issued_at, nonce).as_bytes());
    Ok(mac)
}

pub fn sign_state(
    secret: &str,
    provider: Provider,
    user_id: &str,
    issued_at: i64,
) -> Result<String, OAuthError> {
    let nonce = Uuid::new_v4().simple().to_string();
    let mac = mac_for(secret, provider, user_id, issued_at, &nonce)?;
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("{nonce}.{issued_at}.{signature}"))
}

pub fn verify_state(
    secret: &str,
    provider: Provider,
    user_id: &str,
    state: &str,
    now: i64,
) -> Result<(), OAuthError> {
    let mut parts = state.splitn(3, '.');
    let (Some(nonce), Some(issued_at), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(OAuthError::InvalidState("malformed state".to_string()));
    };

    let issued_at: i64 = issued_at
        .parse()
        .map_err(|_| OAuthError::InvalidState("malformed timestamp".to_string()))?;
    let age = now
        .checked_sub(issued_at)
        .ok_or_else(|| OAuthError::InvalidState("malformed timestamp".to_string()))?;
    if age > STATE_TTL_SECS || age < -CLOCK_SKEW_SECS {
        return Err(OAuthError::InvalidState("state expired".to_string()));
    }

    let signature = hex::decode(signature)
        .map_err(|_| OAuthError::InvalidState("malformed signature".to_string()))?;
    mac_for(secret, provider, user_id, issued_at, nonce)?
        .verify_slice(&signature)
        .map_err(|_| OAuthError::InvalidState("signature mismatch".to_string()))
}
