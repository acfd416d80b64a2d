//! Collection-oriented document store seam.
//!
//! The registry only needs "create, read by collection ordered by one field, merge
//! update, delete" from its backing store, so that is all the trait exposes.

mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use memory::MemoryDocumentStore;

/// Field map of a single stored document.
pub type Fields = Map<String, Value>;

/// Store-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Whole-collection read, optionally ordered ascending by one field.
#[derive(Debug, Clone, Copy)]
pub struct CollectionQuery<'a> {
    pub collection: &'a str,
    pub order_by: Option<&'a str>,
}

impl<'a> CollectionQuery<'a> {
    pub fn collection(collection: &'a str) -> Self {
        Self {
            collection,
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: &'a str) -> Self {
        self.order_by = Some(field);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {id} not found in '{collection}'")]
    NotFound { collection: String, id: DocumentId },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected the operation: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document; the store assigns its identifier.
    async fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError>;

    async fn query(&self, query: CollectionQuery<'_>) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, StoreError>;

    /// Merge `fields` into an existing document. Fails with `NotFound` when absent.
    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Remove a document permanently. Fails with `NotFound` when absent.
    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError>;
}
