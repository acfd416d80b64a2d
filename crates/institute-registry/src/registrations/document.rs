use serde_json::Value;

use super::domain::{
    BroughtItems, PartialRegistrationPayload, RegistrationPayload, RegistrationRecord,
};
use super::schema::{Choice, Gender, Membership, PaymentStatus, RegistrationField};
use super::RepositoryError;
use crate::store::{Document, Fields};

/// Builds store fields, keeping the store's string-typed flags.
struct FieldsWriter(Fields);

impl FieldsWriter {
    fn new() -> Self {
        Self(Fields::new())
    }

    fn text(&mut self, field: RegistrationField, value: &str) -> &mut Self {
        self.0.insert(
            field.wire_name().to_string(),
            Value::String(value.to_string()),
        );
        self
    }

    fn optional(&mut self, field: RegistrationField, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value);
        }
        self
    }

    fn flag(&mut self, field: RegistrationField, value: bool) -> &mut Self {
        self.text(field, if value { "true" } else { "false" })
    }

    fn optional_flag(&mut self, field: RegistrationField, value: Option<bool>) -> &mut Self {
        if let Some(value) = value {
            self.flag(field, value);
        }
        self
    }

    fn finish(&mut self) -> Fields {
        std::mem::take(&mut self.0)
    }
}

pub(crate) fn payload_fields(payload: &RegistrationPayload) -> Fields {
    use RegistrationField as F;

    FieldsWriter::new()
        .text(F::FullName, &payload.full_name)
        .text(F::Email, &payload.email)
        .text(F::Nickname, &payload.nickname)
        .text(F::Birthday, &payload.birthday)
        .text(F::Age, &payload.age)
        .text(F::Gender, payload.gender.as_str())
        .text(F::Address, &payload.address)
        .text(F::ContactNumber, &payload.contact_number)
        .text(F::EducationalAttainment, &payload.educational_attainment)
        .text(F::FatherName, &payload.father_name)
        .text(F::MotherName, &payload.mother_name)
        .text(F::LocalChurch, &payload.local_church)
        .text(F::Membership, payload.membership.as_str())
        .optional(F::ChurchPosition, payload.church_position.as_deref())
        .optional(F::OrganizationPosition, payload.organization_position.as_deref())
        .text(F::AttendanceCount, &payload.attendance_count)
        .text(F::Expectations, &payload.expectations)
        .optional(F::CashContribution, payload.cash_contribution.as_deref())
        .optional(F::RiceContribution, payload.rice_contribution_kg.as_deref())
        .optional(F::InKindContribution, payload.in_kind_contribution.as_deref())
        .flag(F::Plate, payload.brought_items.plate)
        .flag(F::Spoon, payload.brought_items.spoon)
        .flag(F::Glass, payload.brought_items.glass)
        .flag(F::Beddings, payload.brought_items.beddings)
        .finish()
}

pub(crate) fn update_fields(update: &PartialRegistrationPayload) -> Fields {
    use RegistrationField as F;

    FieldsWriter::new()
        .text(F::FullName, &update.full_name)
        .text(F::Nickname, &update.nickname)
        .text(F::Age, &update.age)
        .text(F::Gender, update.gender.as_str())
        .text(F::ContactNumber, &update.contact_number)
        .text(F::LocalChurch, &update.local_church)
        .text(F::Membership, update.membership.as_str())
        .text(F::AttendanceCount, &update.attendance_count)
        .text(F::Expectations, &update.expectations)
        .optional(F::Email, update.email.as_deref())
        .optional(F::Birthday, update.birthday.as_deref())
        .optional(F::Address, update.address.as_deref())
        .optional(F::EducationalAttainment, update.educational_attainment.as_deref())
        .optional(F::FatherName, update.father_name.as_deref())
        .optional(F::MotherName, update.mother_name.as_deref())
        .optional(F::ChurchPosition, update.church_position.as_deref())
        .optional(F::OrganizationPosition, update.organization_position.as_deref())
        .optional(F::CashContribution, update.cash_contribution.as_deref())
        .optional(F::RiceContribution, update.rice_contribution_kg.as_deref())
        .optional(F::InKindContribution, update.in_kind_contribution.as_deref())
        .optional_flag(F::Plate, update.plate)
        .optional_flag(F::Spoon, update.spoon)
        .optional_flag(F::Glass, update.glass)
        .optional_flag(F::Beddings, update.beddings)
        .finish()
}

pub(crate) fn payment_fields(status: PaymentStatus) -> Fields {
    FieldsWriter::new()
        .text(RegistrationField::PaymentStatus, status.as_str())
        .finish()
}

/// Decode a stored document. Missing text reads as empty and any flag other than
/// `"true"` as unchecked; an enumerated value outside its set is a data fault.
pub(crate) fn record_from_document(
    document: Document,
) -> Result<RegistrationRecord, RepositoryError> {
    use RegistrationField as F;

    let text = |field: RegistrationField| {
        document
            .text(field.wire_name())
            .unwrap_or_default()
            .to_string()
    };
    let optional = |field: RegistrationField| {
        document
            .text(field.wire_name())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let flag = |field: RegistrationField| document.text(field.wire_name()) == Some("true");
    let malformed = |field: RegistrationField| RepositoryError::Malformed {
        id: document.id.clone(),
        reason: format!("'{}' holds an unknown value", field.wire_name()),
    };

    let gender = document
        .text(F::Gender.wire_name())
        .and_then(Gender::parse)
        .ok_or_else(|| malformed(F::Gender))?;
    let membership = document
        .text(F::Membership.wire_name())
        .and_then(Membership::parse)
        .ok_or_else(|| malformed(F::Membership))?;

    let payload = RegistrationPayload {
        full_name: text(F::FullName),
        email: text(F::Email),
        nickname: text(F::Nickname),
        birthday: text(F::Birthday),
        age: text(F::Age),
        gender,
        address: text(F::Address),
        contact_number: text(F::ContactNumber),
        educational_attainment: text(F::EducationalAttainment),
        father_name: text(F::FatherName),
        mother_name: text(F::MotherName),
        local_church: text(F::LocalChurch),
        membership,
        church_position: optional(F::ChurchPosition),
        organization_position: optional(F::OrganizationPosition),
        attendance_count: text(F::AttendanceCount),
        expectations: text(F::Expectations),
        cash_contribution: optional(F::CashContribution),
        rice_contribution_kg: optional(F::RiceContribution),
        in_kind_contribution: optional(F::InKindContribution),
        brought_items: BroughtItems {
            plate: flag(F::Plate),
            spoon: flag(F::Spoon),
            glass: flag(F::Glass),
            beddings: flag(F::Beddings),
        },
    };
    let payment_status = PaymentStatus::from_stored(document.text(F::PaymentStatus.wire_name()));

    Ok(RegistrationRecord {
        id: document.id,
        payload,
        payment_status,
    })
}
