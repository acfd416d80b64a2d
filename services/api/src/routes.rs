use crate::infra::{AppState, Components};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use institute_registry::auth::auth_router;
use institute_registry::registrations::registration_router;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_registry_routes(components: &Components) -> Router {
    auth_router(Arc::clone(&components.gate))
        .merge(registration_router(
            Arc::clone(&components.registry),
            components.keys(),
        ))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_components;
    use axum::body::Body;
    use axum::http::Request;
    use institute_registry::config::{
        AppConfig, AppEnvironment, ExportConfig, OfficerAccount, ServerConfig, SessionConfig,
        StoreConfig, TelemetryConfig,
    };
    use institute_registry::registrations::EmptyExportPolicy;
    use institute_registry::store::MemoryDocumentStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            session: SessionConfig {
                secret: "routes-test-session-secret-with-32-bytes".to_string(),
                secure_cookies: false,
                lockout_minutes: 15,
            },
            store: StoreConfig {
                snapshot_path: None,
            },
            export: ExportConfig {
                empty_policy: EmptyExportPolicy::HeaderOnly,
            },
            officers: vec![OfficerAccount {
                email: "secretary@example.com".to_string(),
                password: "hunter22".to_string(),
            }],
        }
    }

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn app(state: AppState) -> Router {
        let components = build_components(&config(), MemoryDocumentStore::new());
        with_registry_routes(&components).layer(Extension(state))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let state = state(false);
        let response = app(state.clone())
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = app(state)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn registry_and_auth_routes_are_mounted() {
        let response = app(state(true))
            .oneshot(
                Request::get("/api/registrations")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(state(true))
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email":"secretary@example.com","password":"hunter22"}"#,
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }
}
