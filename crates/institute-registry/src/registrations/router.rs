use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::domain::RecordId;
use super::schema::RegistrationField;
use super::service::{ActionOutcome, OutcomeKind, RegistrationService};
use super::validation::RawInput;
use crate::auth::{OfficerSession, SessionKeys};
use crate::store::{DocumentId, DocumentStore};

/// Router state: the service plus the keys officer routes verify cookies with.
pub struct RegistryState<S> {
    service: Arc<RegistrationService<S>>,
    keys: SessionKeys,
}

impl<S> Clone for RegistryState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            keys: self.keys.clone(),
        }
    }
}

impl<S> FromRef<RegistryState<S>> for SessionKeys {
    fn from_ref(state: &RegistryState<S>) -> Self {
        state.keys.clone()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderParams {
    #[serde(rename = "orderBy")]
    order_by: Option<String>,
}

impl OrderParams {
    fn field(&self) -> Result<RegistrationField, Response> {
        match self.order_by.as_deref() {
            None | Some("") => Ok(RegistrationField::FullName),
            Some(name) => RegistrationField::parse(name).ok_or_else(|| {
                let payload = json!({
                    "success": false,
                    "message": format!("Unknown sort field '{name}'."),
                });
                (StatusCode::BAD_REQUEST, Json(payload)).into_response()
            }),
        }
    }
}

/// Public registration intake plus the officer dashboard endpoints.
pub fn registration_router<S>(service: Arc<RegistrationService<S>>, keys: SessionKeys) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/registrations",
            post(submit_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/registrations/summary", get(summary_handler::<S>))
        .route("/api/registrations/export", get(export_handler::<S>))
        .route(
            "/api/registrations/:id",
            patch(update_handler::<S>).delete(delete_handler::<S>),
        )
        .route("/api/registrations/:id/payment", post(payment_handler::<S>))
        .with_state(RegistryState { service, keys })
}

fn status_for(kind: OutcomeKind) -> StatusCode {
    match kind {
        OutcomeKind::Done => StatusCode::OK,
        OutcomeKind::Created => StatusCode::CREATED,
        OutcomeKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        OutcomeKind::NotFound => StatusCode::NOT_FOUND,
        OutcomeKind::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn outcome_response(outcome: ActionOutcome) -> Response {
    (status_for(outcome.kind), Json(outcome)).into_response()
}

fn unreadable_body(rejection: JsonRejection) -> Response {
    debug!(reason = %rejection, "unreadable registration body");
    let payload = json!({
        "success": false,
        "message": "Error: Please check your input and try again.",
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(state): State<RegistryState<S>>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match payload {
        Ok(Json(raw)) => outcome_response(state.service.submit(&raw).await),
        Err(rejection) => unreadable_body(rejection),
    }
}

pub(crate) async fn list_handler<S>(
    State(state): State<RegistryState<S>>,
    session: OfficerSession,
    Query(params): Query<OrderParams>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let order_by = match params.field() {
        Ok(field) => field,
        Err(response) => return response,
    };
    match state.service.list(&session, order_by).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => outcome_response(err.outcome()),
    }
}

pub(crate) async fn summary_handler<S>(
    State(state): State<RegistryState<S>>,
    session: OfficerSession,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.service.summary(&session).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => outcome_response(err.outcome()),
    }
}

pub(crate) async fn export_handler<S>(
    State(state): State<RegistryState<S>>,
    session: OfficerSession,
    Query(params): Query<OrderParams>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let order_by = match params.field() {
        Ok(field) => field,
        Err(response) => return response,
    };
    let today = Utc::now().date_naive();
    match state.service.export(&session, order_by, today).await {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, file.content_type().to_string()),
                (header::CONTENT_DISPOSITION, file.content_disposition()),
            ],
            file.body,
        )
            .into_response(),
        Err(err) => outcome_response(err.outcome()),
    }
}

pub(crate) async fn update_handler<S>(
    State(state): State<RegistryState<S>>,
    session: OfficerSession,
    Path(id): Path<String>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => return unreadable_body(rejection),
    };
    let id: RecordId = DocumentId(id);
    outcome_response(state.service.update(&session, &id, &raw).await)
}

pub(crate) async fn delete_handler<S>(
    State(state): State<RegistryState<S>>,
    session: OfficerSession,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    outcome_response(state.service.delete(&session, &DocumentId(id)).await)
}

pub(crate) async fn payment_handler<S>(
    State(state): State<RegistryState<S>>,
    session: OfficerSession,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    outcome_response(state.service.toggle_payment(&session, &DocumentId(id)).await)
}
