use super::common::*;
use chrono::NaiveDate;

use crate::registrations::{
    EmptyExportPolicy, OutcomeKind, PaymentStatus, RegistrationField, RegistryServiceError,
};
use crate::store::DocumentId;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 12).expect("valid date")
}

#[tokio::test]
async fn submit_greets_by_nickname() {
    let service = memory_service(EmptyExportPolicy::Refuse);
    let outcome = service.submit(&juan()).await;

    assert!(outcome.success);
    assert_eq!(outcome.kind, OutcomeKind::Created);
    assert_eq!(outcome.message, "Tagumpay! Maligayang pagdating, Juan!");
    assert!(outcome.record_id.is_some());
}

#[tokio::test]
async fn invalid_submission_never_reaches_store() {
    let service = memory_service(EmptyExportPolicy::Refuse);
    let mut raw = juan();
    raw.remove("pangalan");

    let outcome = service.submit(&raw).await;
    assert!(!outcome.success);
    assert_eq!(outcome.kind, OutcomeKind::Invalid);
    assert_eq!(
        outcome.message,
        "Error: Pakisuri ang iyong input at subukang muli."
    );
    assert!(outcome.errors.contains(RegistrationField::FullName));

    let records = service
        .list(&officer(), RegistrationField::FullName)
        .await
        .expect("listed");
    assert!(records.is_empty());
}

#[tokio::test]
async fn store_failures_become_generic_messages() {
    let service = unavailable_service();
    let session = officer();
    let id = DocumentId("rec-1".to_string());

    let submitted = service.submit(&juan()).await;
    assert_eq!(submitted.kind, OutcomeKind::Failed);
    assert_eq!(
        submitted.message,
        "Error: Hindi matagumpay ang pagpaparehistro. Pakisubukang muli."
    );

    let updated = service.update(&session, &id, &edit()).await;
    assert_eq!(
        updated.message,
        "Error: Failed to update registration. Please try again."
    );

    let deleted = service.delete(&session, &id).await;
    assert_eq!(
        deleted.message,
        "Error: Failed to delete registration. Please try again."
    );

    let listed = service.list(&session, RegistrationField::FullName).await;
    assert!(matches!(listed, Err(RegistryServiceError::Load(_))));
}

#[tokio::test]
async fn update_reports_validation_and_missing_records() {
    let service = memory_service(EmptyExportPolicy::Refuse);
    let session = officer();

    let mut raw = edit();
    raw.insert("kasapian", "Member");
    let rejected = service
        .update(&session, &DocumentId("rec-1".to_string()), &raw)
        .await;
    assert_eq!(rejected.kind, OutcomeKind::Invalid);
    assert_eq!(rejected.message, "Error: Please check your input and try again.");

    let missing = service
        .update(&session, &DocumentId("rec-1".to_string()), &edit())
        .await;
    assert_eq!(missing.kind, OutcomeKind::NotFound);
    assert_eq!(missing.message, "Error: Registration not found.");
}

#[tokio::test]
async fn update_delete_and_toggle_succeed_on_existing_record() {
    let service = memory_service(EmptyExportPolicy::Refuse);
    let session = officer();
    let id = service.submit(&juan()).await.record_id.expect("created");

    let updated = service.update(&session, &id, &edit()).await;
    assert!(updated.success);
    assert_eq!(updated.message, "Registration updated successfully!");

    let toggled = service.toggle_payment(&session, &id).await;
    assert_eq!(toggled.payment_status, Some(PaymentStatus::Paid));
    assert_eq!(toggled.message, "Payment status updated to Paid.");
    let toggled = service.toggle_payment(&session, &id).await;
    assert_eq!(toggled.payment_status, Some(PaymentStatus::Unpaid));

    let deleted = service.delete(&session, &id).await;
    assert!(deleted.success);
    assert_eq!(deleted.message, "Registration deleted successfully!");

    let again = service.toggle_payment(&session, &id).await;
    assert_eq!(again.kind, OutcomeKind::NotFound);
}

#[tokio::test]
async fn summary_counts_membership_and_payment() {
    let service = memory_service(EmptyExportPolicy::Refuse);
    let session = officer();
    let id = service.submit(&juan()).await.record_id.expect("created");
    service.submit(&ana()).await;
    service.toggle_payment(&session, &id).await;

    let summary = service.summary(&session).await.expect("summarised");
    assert_eq!(summary.total, 2);
    assert_eq!(summary.baptized, 1);
    assert_eq!(summary.professing, 1);
    assert_eq!(summary.paid, 1);
    assert_eq!(summary.unpaid, 1);
}

#[tokio::test]
async fn export_names_file_and_honours_empty_policy() {
    let session = officer();

    let refusing = memory_service(EmptyExportPolicy::Refuse);
    let refused = refusing
        .export(&session, RegistrationField::FullName, today())
        .await;
    let err = refused.expect_err("nothing to export");
    assert!(matches!(err, RegistryServiceError::NothingToExport));
    assert_eq!(err.outcome().message, "No registrations to export.");
    assert_eq!(err.kind(), OutcomeKind::NotFound);

    let lenient = memory_service(EmptyExportPolicy::HeaderOnly);
    let file = lenient
        .export(&session, RegistrationField::FullName, today())
        .await
        .expect("header-only export");
    assert_eq!(file.records, 0);
    assert_eq!(file.filename, "registrations_2025-04-12.csv");

    lenient.submit(&juan()).await;
    let file = lenient
        .export(&session, RegistrationField::FullName, today())
        .await
        .expect("export");
    assert_eq!(file.records, 1);
    assert_eq!(file.body.lines().count(), 2);
    assert_eq!(file.content_type(), mime::TEXT_CSV);
}
