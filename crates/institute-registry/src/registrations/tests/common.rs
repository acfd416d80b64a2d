use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::request::Builder;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::auth::{OfficerIdentity, OfficerSession, SessionKeys};
use crate::registrations::document::payload_fields;
use crate::registrations::{
    validate_for_create, EmptyExportPolicy, RawInput, RegistrationPayload, RegistrationRepository,
    RegistrationService, REGISTRATIONS_COLLECTION,
};
use crate::store::{
    CollectionQuery, Document, DocumentId, DocumentStore, Fields, MemoryDocumentStore, StoreError,
};

pub(super) const SECRET: &str = "registrations-test-secret-of-enough-length";

pub(super) fn juan() -> RawInput {
    [
        ("pangalan", "Juan Dela Cruz"),
        ("email", "juan@x.com"),
        ("palayaw", "Juan"),
        ("kaarawan", "2004-05-12"),
        ("edad", "20"),
        ("kasarian", "Lalaki"),
        ("tirahan", "123 Main St"),
        ("contactNumber", "09123456789"),
        ("inabot", "College"),
        ("tatay", "Pedro Dela Cruz"),
        ("nanay", "Maria Dela Cruz"),
        ("localChurch", "Malolos"),
        ("kasapian", "Baptized"),
        ("ilangBeses", "Una"),
        ("mgaInaasahan", "Makilala ang mga kapatid"),
        ("plato", "true"),
        ("kutsara", "false"),
    ]
    .into_iter()
    .collect()
}

pub(super) fn ana() -> RawInput {
    let mut raw = juan();
    raw.insert("pangalan", "Ana \"Annie\" Santos");
    raw.insert("email", "ana@x.com");
    raw.insert("palayaw", "Ana");
    raw.insert("kasarian", "Babae");
    raw.insert("kasapian", "Professing");
    raw.insert("ambagCash", "500");
    raw
}

pub(super) fn payload(raw: &RawInput) -> RegistrationPayload {
    validate_for_create(raw).expect("fixture validates")
}

/// Edit form fields for an existing record.
pub(super) fn edit() -> RawInput {
    [
        ("pangalan", "Juan P. Dela Cruz"),
        ("palayaw", "Jun"),
        ("edad", "21"),
        ("kasarian", "Lalaki"),
        ("contactNumber", "09998887777"),
        ("localChurch", "Bulacan"),
        ("kasapian", "Professing"),
        ("ilangBeses", "Ikalawa"),
        ("mgaInaasahan", "Lumago sa pananampalataya"),
    ]
    .into_iter()
    .collect()
}

pub(super) fn keys() -> SessionKeys {
    SessionKeys::new(SECRET)
}

pub(super) fn officer_token() -> String {
    let identity = OfficerIdentity {
        uid: "officer-001".to_string(),
        email: "secretary@example.com".to_string(),
    };
    let (_, token) = keys().issue(&identity, Utc::now()).expect("token issues");
    token
}

pub(super) fn officer() -> OfficerSession {
    keys()
        .verify(&officer_token(), Utc::now())
        .expect("token verifies")
}

pub(super) type MemoryRepository = RegistrationRepository<MemoryDocumentStore>;

pub(super) fn memory_repository() -> (Arc<MemoryDocumentStore>, MemoryRepository) {
    let store = Arc::new(MemoryDocumentStore::new());
    let repository = RegistrationRepository::new(Arc::clone(&store));
    (store, repository)
}

/// Stores Juan's record with a gender value the schema no longer accepts.
pub(super) async fn insert_malformed(store: &MemoryDocumentStore) -> DocumentId {
    let mut fields = payload_fields(&payload(&juan()));
    fields.insert("kasarian".to_string(), Value::from("lalaki"));
    store
        .create(REGISTRATIONS_COLLECTION, fields)
        .await
        .expect("raw document stored")
}

pub(super) fn memory_service(policy: EmptyExportPolicy) -> RegistrationService<MemoryDocumentStore> {
    let (_, repository) = memory_repository();
    RegistrationService::new(repository, policy)
}

pub(super) fn unavailable_service() -> RegistrationService<UnavailableStore> {
    RegistrationService::new(
        RegistrationRepository::new(Arc::new(UnavailableStore)),
        EmptyExportPolicy::Refuse,
    )
}

/// Store whose backend is always unreachable.
pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn create(&self, _collection: &str, _fields: Fields) -> Result<DocumentId, StoreError> {
        Err(offline())
    }

    async fn query(&self, _query: CollectionQuery<'_>) -> Result<Vec<Document>, StoreError> {
        Err(offline())
    }

    async fn get(
        &self,
        _collection: &str,
        _id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        Err(offline())
    }

    async fn update(
        &self,
        _collection: &str,
        _id: &DocumentId,
        _fields: Fields,
    ) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn delete(&self, _collection: &str, _id: &DocumentId) -> Result<(), StoreError> {
        Err(offline())
    }
}

pub(super) fn with_officer_cookie(builder: Builder) -> Builder {
    builder.header(header::COOKIE, format!("auth-token={}", officer_token()))
}

pub(super) fn json_request(builder: Builder, body: &Value) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub(super) async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}
