//! Registration schema, validation, persistence, and officer dashboard actions.

mod document;
pub mod domain;
pub mod export;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    BroughtItems, PartialRegistrationPayload, RecordId, RegistrationPayload, RegistrationRecord,
};
pub use export::{export_filename, to_delimited_text, EmptyExportPolicy, ExportError, ExportFile};
pub use repository::{RegistrationRepository, RepositoryError, REGISTRATIONS_COLLECTION};
pub use router::{registration_router, RegistryState};
pub use schema::{Choice, FieldRule, Gender, Membership, PaymentStatus, RegistrationField};
pub use service::{ActionOutcome, OutcomeKind, RegistrationService, RegistryServiceError};
pub use summary::RegistrationSummary;
pub use validation::{validate_for_create, validate_for_update, FieldErrors, RawInput};
