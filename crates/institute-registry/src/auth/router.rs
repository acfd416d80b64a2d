use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use super::error::AuthError;
use super::gate::{LoginRequest, SessionGate};
use super::identity::IdentityProvider;
use super::session::{OfficerSession, SessionKeys};

impl<P> FromRef<Arc<SessionGate<P>>> for SessionKeys
where
    P: IdentityProvider + 'static,
{
    fn from_ref(gate: &Arc<SessionGate<P>>) -> Self {
        gate.keys().clone()
    }
}

/// Login, logout, and session lookup endpoints.
pub fn auth_router<P>(gate: Arc<SessionGate<P>>) -> Router
where
    P: IdentityProvider + 'static,
{
    Router::new()
        .route("/api/auth/login", post(login_handler::<P>))
        .route("/api/auth/logout", post(logout_handler::<P>))
        .route("/api/auth/session", get(session_handler))
        .with_state(gate)
}

fn login_error(err: AuthError) -> Response {
    (err.status(), Json(json!({ "error": err.to_string() }))).into_response()
}

pub(crate) async fn login_handler<P>(
    State(gate): State<Arc<SessionGate<P>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response
where
    P: IdentityProvider + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(reason = %rejection, "unreadable login request");
            return login_error(AuthError::MissingFields);
        }
    };

    match gate.login(request, Utc::now()).await {
        Ok(success) => {
            let identity = success.session.identity();
            let body = json!({
                "success": true,
                "message": "Login successful",
                "user": {
                    "uid": identity.uid,
                    "email": identity.email,
                },
            });
            (
                StatusCode::OK,
                [(header::SET_COOKIE, success.cookie.header_value())],
                Json(body),
            )
                .into_response()
        }
        Err(err) => login_error(err),
    }
}

pub(crate) async fn logout_handler<P>(
    State(gate): State<Arc<SessionGate<P>>>,
    headers: HeaderMap,
) -> Response
where
    P: IdentityProvider + 'static,
{
    let (_, cookie) = gate.logout(&headers, Utc::now()).await;
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.header_value())],
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response()
}

pub(crate) async fn session_handler(session: OfficerSession) -> Json<serde_json::Value> {
    Json(json!({
        "uid": session.uid(),
        "email": session.email(),
        "expiresAt": session.expires_at(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::StaticIdentityProvider;
    use crate::config::OfficerAccount;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let provider = StaticIdentityProvider::new(&[OfficerAccount {
            email: "secretary@example.com".to_string(),
            password: "hunter22".to_string(),
        }]);
        let gate = SessionGate::new(
            Arc::new(provider),
            SessionKeys::new("a-test-secret-that-is-at-least-32-bytes"),
            true,
        );
        auth_router(Arc::new(gate))
    }

    fn login(body: Value) -> Request<Body> {
        Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn read_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn successful_login_sets_session_cookie() {
        let response = router()
            .oneshot(login(json!({
                "email": "secretary@example.com",
                "password": "hunter22",
            })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("cookie set")
            .to_string();
        assert!(cookie.starts_with("auth-token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("Secure"));

        let payload = read_json(response).await;
        assert_eq!(payload["success"], json!(true));
        assert_eq!(payload["user"]["uid"], json!("officer-001"));
        assert_eq!(payload["user"]["email"], json!("secretary@example.com"));
    }

    #[tokio::test]
    async fn missing_fields_are_bad_requests() {
        let response = router()
            .oneshot(login(json!({ "email": "secretary@example.com" })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Email and password are required."));
    }

    #[tokio::test]
    async fn rejected_credentials_are_unauthorized() {
        let response = router()
            .oneshot(login(json!({
                "email": "secretary@example.com",
                "password": "not-the-password",
            })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Invalid email or password."));
    }

    #[tokio::test]
    async fn session_endpoint_requires_cookie() {
        let response = router()
            .oneshot(
                Request::get("/api/auth/session")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let response = router()
            .oneshot(
                Request::post("/api/auth/logout")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("cookie cleared");
        assert!(cookie.starts_with("auth-token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn logged_out_token_no_longer_opens_session() {
        let router = router();
        let response = router
            .clone()
            .oneshot(login(json!({
                "email": "secretary@example.com",
                "password": "hunter22",
            })))
            .await
            .expect("route executes");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .expect("cookie set")
            .to_string();

        let session = |cookie: &str| {
            Request::get("/api/auth/session")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("request builds")
        };
        let before = router
            .clone()
            .oneshot(session(&cookie))
            .await
            .expect("route executes");
        assert_eq!(before.status(), StatusCode::OK);

        let logout = router
            .clone()
            .oneshot(
                Request::post("/api/auth/logout")
                    .header(header::COOKIE, cookie.as_str())
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(logout.status(), StatusCode::OK);

        let replayed = router
            .oneshot(session(&cookie))
            .await
            .expect("route executes");
        assert_eq!(replayed.status(), StatusCode::UNAUTHORIZED);
    }
}
