//! Officer sessions.
//!
//! Sessions are stateless signed tokens: `v1.<payload>.<signature>`, where
//! the payload is base64url JSON and the signature is HMAC-SHA256 over the
//! encoded payload. Tokens travel in the `tinsel_session` cookie or an
//! `Authorization: Bearer` header.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::config::SessionConfig;

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "tinsel_session";

const TOKEN_VERSION_V1: &str = "v1";
const MAX_TOKEN_LEN: usize = 2048;

/// Who is behind a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub officer_name: Option<String>,
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub is_admin: bool,
}

impl Identity {
    /// A logged-in officer.
    pub fn officer(name: impl Into<String>) -> Self {
        Self {
            officer_name: Some(name.into()),
            is_logged_in: true,
            is_admin: false,
        }
    }

    /// The officer name if this identity may record claims.
    pub fn acting_officer(&self) -> Option<&str> {
        match &self.officer_name {
            Some(name) if self.is_logged_in && !name.trim().is_empty() => Some(name),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TokenPayload {
    #[serde(flatten)]
    identity: Identity,
    iat: i64,
    exp: i64,
}

/// Token validation failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Malformed session token: {0}")]
    Malformed(String),

    #[error("Unsupported session token version: {0}")]
    UnsupportedVersion(String),

    #[error("Session token signature mismatch")]
    BadSignature,

    #[error("Session expired")]
    Expired,

    #[error("Invalid session payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid signing key")]
    Key,
}

/// Issues and validates session tokens, and checks passcodes.
pub struct SessionGate {
    secret: Vec<u8>,
    officer_passcode: String,
    admin_passcode: String,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionGate {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            officer_passcode: config.officer_passcode.clone(),
            admin_passcode: config.admin_passcode.clone(),
            ttl: Duration::from_secs(config.ttl_secs),
            secure_cookie: config.secure_cookie,
        }
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::Key)
    }

    /// Sign a token for `identity`, valid for the configured TTL.
    pub fn issue(&self, identity: &Identity) -> Result<String, SessionError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, SessionError> {
        let payload = TokenPayload {
            identity: identity.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl.as_secs() as i64,
        };
        let payload_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);

        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}.{}", TOKEN_VERSION_V1, payload_part, sig_part))
    }

    /// Validate a token and return its identity.
    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, SessionError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(SessionError::Malformed("token too long".to_string()));
        }

        let parts: Vec<&str> = token.split('.').collect();
        let (payload_part, sig_part) = match parts.as_slice() {
            [version, payload, sig] if *version == TOKEN_VERSION_V1 => (*payload, *sig),
            [version, _, _] => return Err(SessionError::UnsupportedVersion(version.to_string())),
            _ => return Err(SessionError::Malformed("expected three parts".to_string())),
        };

        let signature = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        let payload: TokenPayload = serde_json::from_slice(&payload_bytes)?;

        if now.timestamp() >= payload.exp {
            return Err(SessionError::Expired);
        }

        Ok(payload.identity)
    }

    /// The identity behind a token, or `None` when it does not validate.
    pub fn identity_of(&self, token: &str) -> Option<Identity> {
        match self.verify(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                None
            }
        }
    }

    /// The identity carried by a request, if any.
    pub fn identity_from_headers(&self, headers: &HeaderMap) -> Option<Identity> {
        token_from_headers(headers).and_then(|token| self.identity_of(token))
    }

    pub fn check_officer_passcode(&self, candidate: &str) -> bool {
        self.passcode_matches(candidate, &self.officer_passcode)
    }

    pub fn check_admin_passcode(&self, candidate: &str) -> bool {
        self.passcode_matches(candidate, &self.admin_passcode)
    }

    /// Constant-time comparison: both sides are MACed and the tags compared.
    fn passcode_matches(&self, candidate: &str, expected: &str) -> bool {
        if expected.is_empty() {
            return false;
        }
        let Ok(mut expected_mac) = self.mac() else {
            return false;
        };
        expected_mac.update(expected.as_bytes());
        let expected_tag = expected_mac.finalize().into_bytes();

        let Ok(mut candidate_mac) = self.mac() else {
            return false;
        };
        candidate_mac.update(candidate.as_bytes());
        candidate_mac.verify_slice(&expected_tag).is_ok()
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.ttl.as_secs()
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Pull a session token from a bearer header or the session cookie.
///
/// The bearer header wins when both are present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests;
