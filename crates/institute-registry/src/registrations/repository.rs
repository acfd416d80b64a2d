use std::sync::Arc;

use tracing::{debug, warn};

use super::document::{payload_fields, payment_fields, record_from_document, update_fields};
use super::domain::{PartialRegistrationPayload, RecordId, RegistrationPayload, RegistrationRecord};
use super::schema::{PaymentStatus, RegistrationField};
use crate::auth::OfficerSession;
use crate::store::{CollectionQuery, DocumentStore, StoreError};

pub const REGISTRATIONS_COLLECTION: &str = "registrations";

/// Failure talking to the backing store, split by direction so callers can pick
/// the right user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("registration read failed: {0}")]
    Read(#[source] StoreError),
    #[error("registration write failed: {0}")]
    Write(#[source] StoreError),
    #[error("registration {id} is malformed: {reason}")]
    Malformed { id: RecordId, reason: String },
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::Read(StoreError::NotFound { .. })
                | RepositoryError::Write(StoreError::NotFound { .. })
        )
    }
}

/// CRUD over the `registrations` collection.
///
/// Everything except `create` demands an [`OfficerSession`]; holding one is the
/// proof that the caller passed the session gate.
pub struct RegistrationRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for RegistrationRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RegistrationRepository<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: &RegistrationPayload) -> Result<RecordId, RepositoryError> {
        let id = self
            .store
            .create(REGISTRATIONS_COLLECTION, payload_fields(payload))
            .await
            .map_err(RepositoryError::Write)?;
        debug!(record_id = %id, "registration stored");
        Ok(id)
    }

    /// Whole collection, ascending by `order_by`. Documents that no longer
    /// decode are logged and left out so one bad record cannot hide the rest.
    pub async fn list(
        &self,
        session: &OfficerSession,
        order_by: RegistrationField,
    ) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        let query =
            CollectionQuery::collection(REGISTRATIONS_COLLECTION).order_by(order_by.wire_name());
        let documents = self.store.query(query).await.map_err(RepositoryError::Read)?;
        debug!(
            officer = session.uid(),
            count = documents.len(),
            order_by = order_by.wire_name(),
            "registrations listed"
        );
        let records = documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id.clone();
                match record_from_document(document) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(record_id = %id, error = %err, "skipping malformed registration");
                        None
                    }
                }
            })
            .collect();
        Ok(records)
    }

    pub async fn get(
        &self,
        session: &OfficerSession,
        id: &RecordId,
    ) -> Result<Option<RegistrationRecord>, RepositoryError> {
        debug!(officer = session.uid(), record_id = %id, "registration fetched");
        self.store
            .get(REGISTRATIONS_COLLECTION, id)
            .await
            .map_err(RepositoryError::Read)?
            .map(record_from_document)
            .transpose()
    }

    /// Merge the edited fields into an existing record. A missing record is a
    /// `Write(NotFound)` failure.
    pub async fn update(
        &self,
        session: &OfficerSession,
        id: &RecordId,
        update: &PartialRegistrationPayload,
    ) -> Result<(), RepositoryError> {
        self.store
            .update(REGISTRATIONS_COLLECTION, id, update_fields(update))
            .await
            .map_err(RepositoryError::Write)?;
        debug!(officer = session.uid(), record_id = %id, "registration updated");
        Ok(())
    }

    /// Permanent removal; deleting an unknown id fails with `Write(NotFound)`.
    pub async fn delete(&self, session: &OfficerSession, id: &RecordId) -> Result<(), RepositoryError> {
        self.store
            .delete(REGISTRATIONS_COLLECTION, id)
            .await
            .map_err(RepositoryError::Write)?;
        debug!(officer = session.uid(), record_id = %id, "registration deleted");
        Ok(())
    }

    pub async fn toggle_payment(
        &self,
        session: &OfficerSession,
        id: &RecordId,
        current: PaymentStatus,
    ) -> Result<PaymentStatus, RepositoryError> {
        let next = current.toggled();
        self.store
            .update(REGISTRATIONS_COLLECTION, id, payment_fields(next))
            .await
            .map_err(RepositoryError::Write)?;
        debug!(
            officer = session.uid(),
            record_id = %id,
            status = next.as_str(),
            "payment status changed"
        );
        Ok(next)
    }
}
