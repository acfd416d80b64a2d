use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{CollectionQuery, Document, DocumentId, DocumentStore, Fields, StoreError};

type Collections = BTreeMap<String, BTreeMap<DocumentId, Fields>>;

/// Process-local document store, optionally mirrored to a JSON snapshot file.
///
/// With a snapshot configured every write is applied to a copy, flushed to disk, and
/// only then made visible, so a failed flush leaves the previous state intact.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a snapshot-backed store, loading the file when it already exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Collections>(&bytes).map_err(|err| {
                StoreError::Unavailable(format!("snapshot {} is corrupt: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Collections::new(),
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "cannot read snapshot {}: {err}",
                    path.display()
                )))
            }
        };

        let documents: usize = collections.values().map(BTreeMap::len).sum();
        info!(path = %path.display(), documents, "document store snapshot loaded");

        Ok(Self {
            collections: RwLock::new(collections),
            snapshot: Some(path),
        })
    }

    async fn commit<T, F>(&self, mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Collections) -> Result<T, StoreError>,
    {
        let mut guard = self.collections.write().await;
        match &self.snapshot {
            None => mutate(&mut guard),
            Some(path) => {
                let mut next = guard.clone();
                let outcome = mutate(&mut next)?;
                write_snapshot(path, &next).await?;
                *guard = next;
                Ok(outcome)
            }
        }
    }
}

async fn write_snapshot(path: &Path, collections: &Collections) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(collections)
        .map_err(|err| StoreError::Rejected(format!("snapshot encoding failed: {err}")))?;
    let staging = path.with_extension("tmp");
    tokio::fs::write(&staging, bytes)
        .await
        .map_err(|err| StoreError::Unavailable(format!("snapshot write failed: {err}")))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|err| StoreError::Unavailable(format!("snapshot swap failed: {err}")))?;
    debug!(path = %path.display(), "document store snapshot flushed");
    Ok(())
}

fn sort_key(fields: &Fields, order_by: &str) -> Option<String> {
    match fields.get(order_by)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn not_found(collection: &str, id: &DocumentId) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.clone(),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        let id = DocumentId(Uuid::new_v4().simple().to_string());
        let assigned = id.clone();
        self.commit(move |collections| {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(assigned, fields);
            Ok(())
        })
        .await?;
        Ok(id)
    }

    async fn query(&self, query: CollectionQuery<'_>) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let mut documents: Vec<Document> = guard
            .get(query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(field) = query.order_by {
            // Missing values sort first; ids keep equal keys deterministic.
            documents.sort_by(|left, right| {
                match sort_key(&left.fields, field).cmp(&sort_key(&right.fields, field)) {
                    Ordering::Equal => left.id.cmp(&right.id),
                    other => other,
                }
            });
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| Document {
                id: id.clone(),
                fields: fields.clone(),
            }))
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.commit(|collections| {
            let existing = collections
                .get_mut(collection)
                .and_then(|documents| documents.get_mut(id))
                .ok_or_else(|| not_found(collection, id))?;
            for (key, value) in fields {
                existing.insert(key, value);
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        self.commit(|collections| {
            collections
                .get_mut(collection)
                .and_then(|documents| documents.remove(id))
                .map(|_| ())
                .ok_or_else(|| not_found(collection, id))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("pangalan".to_string(), json!(name));
        fields
    }

    #[tokio::test]
    async fn query_orders_ascending_with_missing_values_first() {
        let store = MemoryDocumentStore::new();
        store.create("registrations", fields("Maria")).await.expect("create");
        store.create("registrations", fields("Andres")).await.expect("create");
        store
            .create("registrations", Fields::new())
            .await
            .expect("create");

        let documents = store
            .query(CollectionQuery::collection("registrations").order_by("pangalan"))
            .await
            .expect("query");

        let names: Vec<Option<&str>> = documents.iter().map(|doc| doc.text("pangalan")).collect();
        assert_eq!(names, vec![None, Some("Andres"), Some("Maria")]);
    }

    #[tokio::test]
    async fn update_merges_and_preserves_untouched_fields() {
        let store = MemoryDocumentStore::new();
        let mut initial = fields("Juan");
        initial.insert("palayaw".to_string(), json!("Juan"));
        let id = store.create("registrations", initial).await.expect("create");

        let mut patch = Fields::new();
        patch.insert("palayaw".to_string(), json!("Jun"));
        store
            .update("registrations", &id, patch)
            .await
            .expect("update");

        let stored = store
            .get("registrations", &id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.text("pangalan"), Some("Juan"));
        assert_eq!(stored.text("palayaw"), Some("Jun"));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_documents() {
        let store = MemoryDocumentStore::new();
        let missing = DocumentId("missing".to_string());

        assert!(matches!(
            store.update("registrations", &missing, Fields::new()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("registrations", &missing).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.json");

        let id = {
            let store = MemoryDocumentStore::open(&path).await.expect("open");
            store
                .create("registrations", fields("Juan Dela Cruz"))
                .await
                .expect("create")
        };

        let reopened = MemoryDocumentStore::open(&path).await.expect("reopen");
        let stored = reopened
            .get("registrations", &id)
            .await
            .expect("get")
            .expect("persisted");
        assert_eq!(stored.text("pangalan"), Some("Juan Dela Cruz"));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.json");
        std::fs::write(&path, b"not json").expect("write");

        match MemoryDocumentStore::open(&path).await {
            Err(StoreError::Unavailable(message)) => assert!(message.contains("corrupt")),
            other => panic!("expected unavailable error, got {other:?}"),
        }
    }
}
