use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use super::error::AuthError;
use super::identity::OfficerIdentity;

pub const SESSION_COOKIE_NAME: &str = "auth-token";
pub const SESSION_TTL_DAYS: i64 = 7;

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    uid: String,
    email: String,
    exp: i64,
}

/// Server-verified officer session.
///
/// Only obtainable by verifying a signed token or completing a login, which is what
/// lets registry operations demand one as proof of authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerSession {
    identity: OfficerIdentity,
    expires_at: DateTime<Utc>,
}

impl OfficerSession {
    pub fn identity(&self) -> &OfficerIdentity {
        &self.identity
    }

    pub fn uid(&self) -> &str {
        &self.identity.uid
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// HMAC-SHA256 key used to sign and verify session tokens.
///
/// Clones share one revocation list, keyed by token signature and holding each
/// entry only until the token would have expired anyway.
#[derive(Clone)]
pub struct SessionKeys {
    secret: Arc<[u8]>,
    ttl: Duration,
    revoked: Arc<Mutex<HashMap<Vec<u8>, i64>>>,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            ttl: Duration::days(SESSION_TTL_DAYS),
            revoked: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Failure)
    }

    /// Sign a token for `identity`, valid for the session TTL from `now`.
    pub fn issue(
        &self,
        identity: &OfficerIdentity,
        now: DateTime<Utc>,
    ) -> Result<(OfficerSession, String), AuthError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            exp: expires_at.timestamp(),
        };
        let encoded = serde_json::to_vec(&claims).map_err(|_| AuthError::Failure)?;
        let payload = hex::encode(encoded);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        let session = OfficerSession {
            identity: identity.clone(),
            expires_at,
        };
        Ok((session, format!("{payload}.{signature}")))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<OfficerSession, AuthError> {
        self.verify_signed(token, now).map(|(session, _)| session)
    }

    /// Invalidate `token` before its expiry. Only tokens that still verify are
    /// recorded; lapsed entries are dropped on the way.
    pub fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<OfficerSession, AuthError> {
        let (session, signature) = self.verify_signed(token, now)?;
        let mut revoked = self.revoked.lock().unwrap_or_else(PoisonError::into_inner);
        revoked.retain(|_, exp| *exp > now.timestamp());
        revoked.insert(signature, session.expires_at.timestamp());
        debug!(uid = %session.uid(), revoked = revoked.len(), "session token revoked");
        Ok(session)
    }

    fn is_revoked(&self, signature: &[u8]) -> bool {
        self.revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(signature)
    }

    #[cfg(test)]
    fn revoked_count(&self) -> usize {
        self.revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn verify_signed(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(OfficerSession, Vec<u8>), AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidSession)?;
        let signature = hex::decode(signature).map_err(|_| AuthError::InvalidSession)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSession)?;
        if self.is_revoked(&signature) {
            return Err(AuthError::InvalidSession);
        }

        let decoded = hex::decode(payload).map_err(|_| AuthError::InvalidSession)?;
        let claims: SessionClaims =
            serde_json::from_slice(&decoded).map_err(|_| AuthError::InvalidSession)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::SessionExpired);
        }
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidSession)?;

        let session = OfficerSession {
            identity: OfficerIdentity {
                uid: claims.uid,
                email: claims.email,
            },
            expires_at,
        };
        Ok((session, signature))
    }
}

/// `Set-Cookie` value for the session: http-only, `Lax`, site-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
    max_age_secs: i64,
    secure: bool,
}

impl SessionCookie {
    pub fn issue(token: String, ttl: Duration, secure: bool) -> Self {
        Self {
            value: token,
            max_age_secs: ttl.num_seconds(),
            secure,
        }
    }

    pub fn cleared(secure: bool) -> Self {
        Self {
            value: String::new(),
            max_age_secs: 0,
            secure,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    pub fn header_value(&self) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.value, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Find the session token among the request's `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value)
}

#[async_trait]
impl<S> FromRequestParts<S> for OfficerSession
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let token = token_from_headers(&parts.headers).ok_or(AuthError::MissingSession)?;
        keys.verify(token, Utc::now()).map_err(|err| {
            debug!(error = ?err, path = %parts.uri.path(), "officer session rejected");
            err
        })
    }
}
