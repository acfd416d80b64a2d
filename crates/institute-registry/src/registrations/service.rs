use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info};

use super::domain::{RecordId, RegistrationRecord};
use super::export::{export_filename, to_delimited_text, EmptyExportPolicy, ExportError, ExportFile};
use super::repository::{RegistrationRepository, RepositoryError};
use super::schema::{PaymentStatus, RegistrationField};
use super::summary::RegistrationSummary;
use super::validation::{validate_for_create, validate_for_update, FieldErrors, RawInput};
use crate::auth::OfficerSession;
use crate::store::DocumentStore;

const SUBMIT_INVALID: &str = "Error: Pakisuri ang iyong input at subukang muli.";
const SUBMIT_FAILED: &str = "Error: Hindi matagumpay ang pagpaparehistro. Pakisubukang muli.";
const UPDATE_DONE: &str = "Registration updated successfully!";
const UPDATE_INVALID: &str = "Error: Please check your input and try again.";
const UPDATE_FAILED: &str = "Error: Failed to update registration. Please try again.";
const DELETE_DONE: &str = "Registration deleted successfully!";
const DELETE_FAILED: &str = "Error: Failed to delete registration. Please try again.";
const PAYMENT_FAILED: &str = "Error: Failed to update payment status. Please try again.";
const NOT_FOUND: &str = "Error: Registration not found.";

/// How an action ended, for callers that need more than `success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Done,
    Created,
    Invalid,
    NotFound,
    Failed,
}

/// Uniform `{success, message}` result of a visitor or officer action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    #[serde(skip)]
    pub kind: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

impl ActionOutcome {
    fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            success: matches!(kind, OutcomeKind::Done | OutcomeKind::Created),
            message: message.into(),
            errors: FieldErrors::default(),
            kind,
            record_id: None,
            payment_status: None,
        }
    }

    fn invalid(message: &str, errors: FieldErrors) -> Self {
        Self {
            errors,
            ..Self::new(OutcomeKind::Invalid, message)
        }
    }

    fn failed(message: &str, err: &RepositoryError) -> Self {
        if err.is_not_found() {
            Self::new(OutcomeKind::NotFound, NOT_FOUND)
        } else {
            Self::new(OutcomeKind::Failed, message)
        }
    }
}

/// Failure of a read-side dashboard action. `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum RegistryServiceError {
    #[error("Error: Failed to load registrations. Please try again.")]
    Load(#[source] RepositoryError),
    #[error("No registrations to export.")]
    NothingToExport,
    #[error("Error: Failed to export registrations. Please try again.")]
    Export(#[source] ExportError),
}

impl RegistryServiceError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            RegistryServiceError::NothingToExport => OutcomeKind::NotFound,
            RegistryServiceError::Load(_) | RegistryServiceError::Export(_) => OutcomeKind::Failed,
        }
    }

    pub fn outcome(&self) -> ActionOutcome {
        ActionOutcome::new(self.kind(), self.to_string())
    }
}

/// Action boundary: validates input, calls the repository, and turns store faults
/// into generic messages after logging their cause.
pub struct RegistrationService<S> {
    repository: RegistrationRepository<S>,
    empty_export: EmptyExportPolicy,
}

impl<S> RegistrationService<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(repository: RegistrationRepository<S>, empty_export: EmptyExportPolicy) -> Self {
        Self {
            repository,
            empty_export,
        }
    }

    pub fn repository(&self) -> &RegistrationRepository<S> {
        &self.repository
    }

    /// Public registration form submission.
    pub async fn submit(&self, raw: &RawInput) -> ActionOutcome {
        let payload = match validate_for_create(raw) {
            Ok(payload) => payload,
            Err(errors) => {
                debug!(fields = %errors, "registration rejected");
                return ActionOutcome::invalid(SUBMIT_INVALID, errors);
            }
        };

        match self.repository.create(&payload).await {
            Ok(id) => {
                info!(record_id = %id, "registration received");
                ActionOutcome {
                    record_id: Some(id),
                    ..ActionOutcome::new(
                        OutcomeKind::Created,
                        format!("Tagumpay! Maligayang pagdating, {}!", payload.nickname),
                    )
                }
            }
            Err(err) => {
                error!(error = %err, "failed to store registration");
                ActionOutcome::new(OutcomeKind::Failed, SUBMIT_FAILED)
            }
        }
    }

    pub async fn update(
        &self,
        session: &OfficerSession,
        id: &RecordId,
        raw: &RawInput,
    ) -> ActionOutcome {
        let update = match validate_for_update(raw) {
            Ok(update) => update,
            Err(errors) => {
                debug!(record_id = %id, fields = %errors, "registration edit rejected");
                return ActionOutcome::invalid(UPDATE_INVALID, errors);
            }
        };

        match self.repository.update(session, id, &update).await {
            Ok(()) => ActionOutcome {
                record_id: Some(id.clone()),
                ..ActionOutcome::new(OutcomeKind::Done, UPDATE_DONE)
            },
            Err(err) => {
                error!(record_id = %id, error = %err, "failed to update registration");
                ActionOutcome::failed(UPDATE_FAILED, &err)
            }
        }
    }

    pub async fn delete(&self, session: &OfficerSession, id: &RecordId) -> ActionOutcome {
        match self.repository.delete(session, id).await {
            Ok(()) => {
                info!(officer = session.uid(), record_id = %id, "registration deleted");
                ActionOutcome {
                    record_id: Some(id.clone()),
                    ..ActionOutcome::new(OutcomeKind::Done, DELETE_DONE)
                }
            }
            Err(err) => {
                error!(record_id = %id, error = %err, "failed to delete registration");
                ActionOutcome::failed(DELETE_FAILED, &err)
            }
        }
    }

    /// Flip the stored payment mark, reading the current one first.
    pub async fn toggle_payment(&self, session: &OfficerSession, id: &RecordId) -> ActionOutcome {
        let current = match self.repository.get(session, id).await {
            Ok(Some(record)) => record.payment_status,
            Ok(None) => return ActionOutcome::new(OutcomeKind::NotFound, NOT_FOUND),
            Err(err) => {
                error!(record_id = %id, error = %err, "failed to read registration");
                return ActionOutcome::failed(PAYMENT_FAILED, &err);
            }
        };

        match self.repository.toggle_payment(session, id, current).await {
            Ok(status) => ActionOutcome {
                record_id: Some(id.clone()),
                payment_status: Some(status),
                ..ActionOutcome::new(
                    OutcomeKind::Done,
                    format!("Payment status updated to {}.", status.label()),
                )
            },
            Err(err) => {
                error!(record_id = %id, error = %err, "failed to update payment status");
                ActionOutcome::failed(PAYMENT_FAILED, &err)
            }
        }
    }

    pub async fn list(
        &self,
        session: &OfficerSession,
        order_by: RegistrationField,
    ) -> Result<Vec<RegistrationRecord>, RegistryServiceError> {
        self.repository.list(session, order_by).await.map_err(|err| {
            error!(error = %err, "failed to load registrations");
            RegistryServiceError::Load(err)
        })
    }

    pub async fn summary(
        &self,
        session: &OfficerSession,
    ) -> Result<RegistrationSummary, RegistryServiceError> {
        let records = self.list(session, RegistrationField::FullName).await?;
        Ok(RegistrationSummary::from_records(&records))
    }

    /// CSV of every registration in `order_by` order, named for `today`.
    pub async fn export(
        &self,
        session: &OfficerSession,
        order_by: RegistrationField,
        today: NaiveDate,
    ) -> Result<ExportFile, RegistryServiceError> {
        let records = self.list(session, order_by).await?;
        let body = to_delimited_text(&records, self.empty_export).map_err(|err| match err {
            ExportError::Empty => RegistryServiceError::NothingToExport,
            other => {
                error!(error = %other, "failed to render export");
                RegistryServiceError::Export(other)
            }
        })?;

        info!(officer = session.uid(), records = records.len(), "registrations exported");
        Ok(ExportFile {
            filename: export_filename(today),
            body,
            records: records.len(),
        })
    }
}
