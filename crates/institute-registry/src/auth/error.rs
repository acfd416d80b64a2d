use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::identity::ProviderError;

/// Authentication failures. `Display` is the user-facing message; provider codes
/// and token details never reach the client.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email and password are required.")]
    MissingFields,
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Invalid credentials. Please check your email and password.")]
    CredentialRejected,
    #[error("Too many failed attempts. Please try again later.")]
    TooManyAttempts,
    #[error("An error occurred during login.")]
    Failure,
    #[error("Please log in to continue.")]
    MissingSession,
    #[error("Your session has expired. Please log in again.")]
    InvalidSession,
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingFields | AuthError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::UserNotFound | ProviderError::WrongPassword => {
                AuthError::InvalidCredentials
            }
            ProviderError::InvalidCredential => AuthError::CredentialRejected,
            ProviderError::TooManyRequests => AuthError::TooManyAttempts,
            ProviderError::Unavailable(_) => AuthError::Failure,
        }
    }
}

/// Rejection used when an officer route is reached without a valid session.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let payload = json!({
            "success": false,
            "message": self.to_string(),
        });
        (self.status(), Json(payload)).into_response()
    }
}
