use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use validator::ValidateEmail;

use super::error::AuthError;
use super::identity::{IdentityProvider, OfficerIdentity};
use super::session::{token_from_headers, OfficerSession, SessionCookie, SessionKeys};

const MIN_PASSWORD_CHARS: usize = 6;

/// Where a visitor stands in the officer login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating { email: String },
    Authenticated(OfficerIdentity),
}

impl SessionState {
    /// Credentials were submitted; any previous session is superseded.
    pub fn submit(self, email: &str) -> Self {
        Self::Authenticating {
            email: email.to_string(),
        }
    }

    pub fn accept(self, identity: OfficerIdentity) -> Self {
        match self {
            Self::Authenticating { .. } => Self::Authenticated(identity),
            other => other,
        }
    }

    pub fn reject(self) -> Self {
        match self {
            Self::Authenticating { .. } => Self::Anonymous,
            other => other,
        }
    }

    pub fn logout(self) -> Self {
        Self::Anonymous
    }

    pub fn officer(&self) -> Option<&OfficerIdentity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Body of the login endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    fn credentials(self) -> Result<(String, String), AuthError> {
        let email = self.email.map(|email| email.trim().to_string());
        match (email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                if !email.validate_email() {
                    return Err(AuthError::InvalidRequest("Invalid email address."));
                }
                if password.chars().count() < MIN_PASSWORD_CHARS {
                    return Err(AuthError::InvalidRequest(
                        "Password must be at least 6 characters.",
                    ));
                }
                Ok((email, password))
            }
            _ => Err(AuthError::MissingFields),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub session: OfficerSession,
    pub cookie: SessionCookie,
}

/// Issues and clears officer sessions on top of an identity provider.
pub struct SessionGate<P> {
    provider: Arc<P>,
    keys: SessionKeys,
    secure_cookies: bool,
}

impl<P> SessionGate<P>
where
    P: IdentityProvider + 'static,
{
    pub fn new(provider: Arc<P>, keys: SessionKeys, secure_cookies: bool) -> Self {
        Self {
            provider,
            keys,
            secure_cookies,
        }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub async fn login(
        &self,
        request: LoginRequest,
        now: DateTime<Utc>,
    ) -> Result<LoginSuccess, AuthError> {
        let (email, password) = request.credentials()?;
        let state = SessionState::Anonymous.submit(&email);

        let state = match self.provider.sign_in(&email, &password).await {
            Ok(identity) => state.accept(identity),
            Err(err) => {
                warn!(%email, reason = %err, "officer sign-in rejected");
                return Err(AuthError::from(err));
            }
        };

        let identity = state.officer().ok_or(AuthError::Failure)?;
        let (session, token) = self.keys.issue(identity, now)?;
        let cookie = SessionCookie::issue(token, self.keys.ttl(), self.secure_cookies);

        info!(uid = %session.uid(), email = %session.email(), "officer signed in");
        Ok(LoginSuccess { session, cookie })
    }

    /// Resolve the state carried by a request's session cookie.
    pub fn current(&self, headers: &HeaderMap, now: DateTime<Utc>) -> SessionState {
        token_from_headers(headers)
            .and_then(|token| self.keys.verify(token, now).ok())
            .map(|session| SessionState::Authenticated(session.identity().clone()))
            .unwrap_or(SessionState::Anonymous)
    }

    /// Revoke the request's token, sign out at the provider (best effort) and
    /// return the clearing cookie.
    pub async fn logout(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> (SessionState, SessionCookie) {
        let state = match token_from_headers(headers).map(|token| self.keys.revoke(token, now)) {
            Some(Ok(session)) => SessionState::Authenticated(session.identity().clone()),
            _ => SessionState::Anonymous,
        };
        if let Some(identity) = state.officer() {
            if let Err(err) = self.provider.sign_out(identity).await {
                warn!(uid = %identity.uid, reason = %err, "provider sign-out failed");
            }
            info!(uid = %identity.uid, "officer signed out");
        }
        (state.logout(), SessionCookie::cleared(self.secure_cookies))
    }
}
