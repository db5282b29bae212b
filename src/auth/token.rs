//! Token pair storage shape and access-token identity decoding.
//!
//! The remote service issues JWT access/refresh pairs. The client never
//! verifies signatures (it has no key material); it decodes the payload
//! segment structurally and checks the `exp` claim, so a stale token is
//! rejected locally instead of silently yielding a plausible identity.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Access/refresh credential pair issued by the remote service.
///
/// Opaque to the client apart from the access token's payload. Replaced
/// wholesale on login, deleted on logout; absence means unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Identity fields decoded from the access token payload.
///
/// Derived, never constructed directly; recomputed whenever the stored
/// [`TokenPair`] changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    username: Option<String>,
    user_id: Option<i64>,
    exp: Option<i64>,
}

/// Failures decoding an identity out of an access token.
#[derive(Debug, PartialEq, Eq)]
pub enum IdentityError {
    /// The token is not structurally a JWT or its payload is not valid
    /// base64url-encoded JSON.
    Malformed(String),
    /// The payload decoded but lacks a claim the client requires.
    MissingClaim(&'static str),
    /// The `exp` claim is in the past.
    Expired,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::Malformed(detail) => write!(f, "malformed access token: {detail}"),
            IdentityError::MissingClaim(claim) => {
                write!(f, "access token is missing the '{claim}' claim")
            }
            IdentityError::Expired => write!(f, "access token has expired"),
        }
    }
}

impl Error for IdentityError {}

/// Decode and validate a [`UserIdentity`] from an access token.
///
/// Validation covers structure and expiry only; signature verification
/// requires the server secret and is left to the remote service, which
/// rejects tampered tokens on the next request.
pub fn decode_identity(access: &str, now: DateTime<Utc>) -> Result<UserIdentity, IdentityError> {
    let mut segments = access.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(IdentityError::Malformed(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::Malformed(format!("payload is not base64url: {e}")))?;
    let claims: AccessClaims = serde_json::from_slice(&bytes)
        .map_err(|e| IdentityError::Malformed(format!("payload is not valid JSON: {e}")))?;

    if let Some(exp) = claims.exp {
        if exp <= now.timestamp() {
            return Err(IdentityError::Expired);
        }
    }

    let username = claims
        .username
        .ok_or(IdentityError::MissingClaim("username"))?;

    Ok(UserIdentity {
        username,
        user_id: claims.user_id,
    })
}

#[cfg(test)]
pub(crate) fn encode_test_token(username: &str, user_id: i64, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "token_type": "access",
            "username": username,
            "user_id": user_id,
            "exp": exp,
        })
        .to_string(),
    );
    format!("{header}.{payload}.unsigned")
}
