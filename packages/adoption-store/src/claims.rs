//! Unverified JWT payload decoding.
//!
//! The client only needs the identity carried in the token. Signature
//! verification is the API's job, so the payload segment is base64-decoded
//! and parsed as JSON, nothing more.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TokenError;

const MS_NAME_IDENTIFIER: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
const MS_EMAIL: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
const MS_NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
const MS_ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

const USER_ID_KEYS: &[&str] = &["userId", "user_id", "nameid", "id", MS_NAME_IDENTIFIER, "sub"];
const EMAIL_KEYS: &[&str] = &["email", MS_EMAIL];
const NAME_KEYS: &[&str] = &["name", "unique_name", "fullName", MS_NAME];
const ROLE_KEYS: &[&str] = &["role", "roles", MS_ROLE];

/// Identity claims decoded from an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: Option<i64>,
    /// The full payload, for claims the client does not model.
    pub raw: Map<String, Value>,
}

impl Claims {
    fn from_payload(raw: Map<String, Value>) -> Self {
        Self {
            user_id: first_text(&raw, USER_ID_KEYS),
            email: first_text(&raw, EMAIL_KEYS),
            name: first_text(&raw, NAME_KEYS),
            roles: roles(&raw),
            exp: raw.get("exp").and_then(|v| {
                v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
            }),
            raw,
        }
    }

    /// A token is usable only while `exp` lies strictly in the future.
    /// Tokens without `exp` count as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.exp.is_some_and(|exp| exp > now.timestamp())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now)
    }

    /// Key used to look up the full profile.
    pub fn identity_key(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Decode the payload segment of a JWT without checking its signature.
pub fn decode_token(token: &str) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Format(parts.len()));
    }

    let payload = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('='))?;
    let raw: Map<String, Value> = serde_json::from_slice(&payload)?;

    Ok(Claims::from_payload(raw))
}

/// Decode and require the token to be unexpired at `now`.
pub fn decode_valid_token(token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
    let claims = decode_token(token)?;
    if !claims.is_valid_at(now) {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

fn first_text(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn roles(raw: &Map<String, Value>) -> Vec<String> {
    for key in ROLE_KEYS {
        match raw.get(*key) {
            Some(Value::String(s)) => return vec![s.clone()],
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
            }
            _ => {}
        }
    }
    Vec::new()
}
