use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::domain::RegistrationRecord;
use super::schema::{Choice, RegistrationField};

/// What to produce when there is nothing to export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyExportPolicy {
    /// Signal [`ExportError::Empty`] instead of writing a file.
    #[default]
    Refuse,
    HeaderOnly,
}

impl EmptyExportPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "refuse" => Some(Self::Refuse),
            "header" | "header-only" => Some(Self::HeaderOnly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refuse => "refuse",
            Self::HeaderOnly => "header",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No registrations to export.")]
    Empty,
    #[error("failed to encode export: {0}")]
    Encode(#[from] csv::Error),
    #[error("export is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A rendered export ready to be written to disk or sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub body: String,
    pub records: usize,
}

impl ExportFile {
    pub fn content_type(&self) -> mime::Mime {
        mime::TEXT_CSV
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("registrations_{}.csv", date.format("%Y-%m-%d"))
}

fn header_row() -> Vec<&'static str> {
    std::iter::once("ID")
        .chain(RegistrationField::ordered().into_iter().map(RegistrationField::label))
        .collect()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn cell(record: &RegistrationRecord, field: RegistrationField) -> &str {
    use RegistrationField as F;
    let payload = &record.payload;
    let items = &payload.brought_items;

    match field {
        F::FullName => &payload.full_name,
        F::Email => &payload.email,
        F::Nickname => &payload.nickname,
        F::Birthday => &payload.birthday,
        F::Age => &payload.age,
        F::Gender => payload.gender.as_str(),
        F::Address => &payload.address,
        F::ContactNumber => &payload.contact_number,
        F::EducationalAttainment => &payload.educational_attainment,
        F::FatherName => &payload.father_name,
        F::MotherName => &payload.mother_name,
        F::LocalChurch => &payload.local_church,
        F::Membership => payload.membership.as_str(),
        F::ChurchPosition => payload.church_position.as_deref().unwrap_or_default(),
        F::OrganizationPosition => payload.organization_position.as_deref().unwrap_or_default(),
        F::AttendanceCount => &payload.attendance_count,
        F::Expectations => &payload.expectations,
        F::CashContribution => payload.cash_contribution.as_deref().unwrap_or_default(),
        F::RiceContribution => payload.rice_contribution_kg.as_deref().unwrap_or_default(),
        F::InKindContribution => payload.in_kind_contribution.as_deref().unwrap_or_default(),
        F::Plate => yes_no(items.plate),
        F::Spoon => yes_no(items.spoon),
        F::Glass => yes_no(items.glass),
        F::Beddings => yes_no(items.beddings),
        F::PaymentStatus => record.payment_status.label(),
    }
}

/// Render records as CSV: a header row, then one fully quoted row per record.
pub fn to_delimited_text(
    records: &[RegistrationRecord],
    policy: EmptyExportPolicy,
) -> Result<String, ExportError> {
    if records.is_empty() && policy == EmptyExportPolicy::Refuse {
        return Err(ExportError::Empty);
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(header_row())?;
    for record in records {
        let row = std::iter::once(record.id.as_str()).chain(
            RegistrationField::ordered()
                .into_iter()
                .map(|field| cell(record, field)),
        );
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Encode(err.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}
