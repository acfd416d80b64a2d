//! Applies the registration schema to untrusted input.
//!
//! Validation failure is the expected "bad input" branch: callers get every failing
//! field at once, keyed by wire name, and nothing reaches the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::ValidateEmail;

use super::domain::{BroughtItems, PartialRegistrationPayload, RegistrationPayload};
use super::schema::{Choice, FieldRule, Gender, Membership, RegistrationField};

/// Raw form submission: field name to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput(BTreeMap<String, String>);

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Coerce a JSON object into raw strings. Booleans become `"true"`/`"false"` and
    /// numbers their decimal text; nulls and nested values are dropped.
    pub fn from_json(object: Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    Value::Bool(flag) => flag.to_string(),
                    Value::Number(number) => number.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((key, text))
            })
            .collect();
        Self(fields)
    }
}

impl<K, V> FromIterator<(K, V)> for RawInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_json(object))
    }
}

/// Field name to the human-readable messages explaining why it was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: RegistrationField, message: impl Into<String>) {
        self.0
            .entry(field.wire_name())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: RegistrationField) -> bool {
        self.0.contains_key(field.wire_name())
    }

    pub fn messages(&self, field: RegistrationField) -> &[String] {
        self.0
            .get(field.wire_name())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

fn is_valid_email(value: &str) -> bool {
    value.to_owned().validate_email()
}

fn check(rule: FieldRule, value: Option<&str>) -> Result<Option<String>, String> {
    match rule {
        FieldRule::Text { min_chars, message } => match value {
            Some(text) if text.chars().count() >= min_chars => Ok(Some(text.to_string())),
            _ => Err(message.to_string()),
        },
        FieldRule::Email { message } => match value {
            Some(text) if is_valid_email(text) => Ok(Some(text.to_string())),
            _ => Err(message.to_string()),
        },
        FieldRule::Choice { options, missing } => match value {
            None | Some("") => Err(missing.to_string()),
            Some(text) if options.contains(&text) => Ok(Some(text.to_string())),
            Some(_) => Err(format!(
                "Kailangan mong pumili ng isa sa: {}.",
                options.join(", ")
            )),
        },
        FieldRule::OptionalText => Ok(value.filter(|text| !text.is_empty()).map(str::to_string)),
        FieldRule::Flag => Ok(value.map(|text| (text == "true").to_string())),
        FieldRule::Managed => Ok(None),
    }
}

struct FieldReader<'a> {
    raw: &'a RawInput,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a RawInput) -> Self {
        Self {
            raw,
            errors: FieldErrors::default(),
        }
    }

    fn checked(&mut self, field: RegistrationField) -> Option<String> {
        match check(field.create_rule(), self.raw.get(field.wire_name())) {
            Ok(value) => value,
            Err(message) => {
                self.errors.push(field, message);
                None
            }
        }
    }

    fn text(&mut self, field: RegistrationField) -> String {
        self.checked(field).unwrap_or_default()
    }

    fn choice<T: Choice>(&mut self, field: RegistrationField) -> Option<T> {
        self.checked(field).as_deref().and_then(T::parse)
    }

    fn flag(&mut self, field: RegistrationField) -> bool {
        self.checked(field).as_deref() == Some("true")
    }

    /// Present keys are held to the create rule; absent keys are skipped.
    fn supplied(&mut self, field: RegistrationField) -> Option<String> {
        self.raw.get(field.wire_name())?;
        self.checked(field)
    }

    /// Present optional text is taken verbatim so an empty value can clear it.
    fn supplied_text(&self, field: RegistrationField) -> Option<String> {
        self.raw.get(field.wire_name()).map(str::to_string)
    }

    fn supplied_flag(&self, field: RegistrationField) -> Option<bool> {
        self.raw.get(field.wire_name()).map(|text| text == "true")
    }

    fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

/// Apply the full registration schema.
pub fn validate_for_create(raw: &RawInput) -> Result<RegistrationPayload, FieldErrors> {
    use RegistrationField as F;

    let mut reader = FieldReader::new(raw);
    let full_name = reader.text(F::FullName);
    let email = reader.text(F::Email);
    let nickname = reader.text(F::Nickname);
    let birthday = reader.text(F::Birthday);
    let age = reader.text(F::Age);
    let gender = reader.choice::<Gender>(F::Gender);
    let address = reader.text(F::Address);
    let contact_number = reader.text(F::ContactNumber);
    let educational_attainment = reader.text(F::EducationalAttainment);
    let father_name = reader.text(F::FatherName);
    let mother_name = reader.text(F::MotherName);
    let local_church = reader.text(F::LocalChurch);
    let membership = reader.choice::<Membership>(F::Membership);
    let church_position = reader.checked(F::ChurchPosition);
    let organization_position = reader.checked(F::OrganizationPosition);
    let attendance_count = reader.text(F::AttendanceCount);
    let expectations = reader.text(F::Expectations);
    let cash_contribution = reader.checked(F::CashContribution);
    let rice_contribution_kg = reader.checked(F::RiceContribution);
    let in_kind_contribution = reader.checked(F::InKindContribution);
    let brought_items = BroughtItems {
        plate: reader.flag(F::Plate),
        spoon: reader.flag(F::Spoon),
        glass: reader.flag(F::Glass),
        beddings: reader.flag(F::Beddings),
    };

    let errors = reader.into_errors();
    match (gender, membership) {
        (Some(gender), Some(membership)) if errors.is_empty() => Ok(RegistrationPayload {
            full_name,
            email,
            nickname,
            birthday,
            age,
            gender,
            address,
            contact_number,
            educational_attainment,
            father_name,
            mother_name,
            local_church,
            membership,
            church_position,
            organization_position,
            attendance_count,
            expectations,
            cash_contribution,
            rice_contribution_kg,
            in_kind_contribution,
            brought_items,
        }),
        _ => Err(errors),
    }
}

/// Apply the reduced schema used by officer edits.
pub fn validate_for_update(raw: &RawInput) -> Result<PartialRegistrationPayload, FieldErrors> {
    use RegistrationField as F;

    let mut reader = FieldReader::new(raw);
    let full_name = reader.text(F::FullName);
    let nickname = reader.text(F::Nickname);
    let age = reader.text(F::Age);
    let gender = reader.choice::<Gender>(F::Gender);
    let contact_number = reader.text(F::ContactNumber);
    let local_church = reader.text(F::LocalChurch);
    let membership = reader.choice::<Membership>(F::Membership);
    let attendance_count = reader.text(F::AttendanceCount);
    let expectations = reader.text(F::Expectations);

    let email = reader.supplied(F::Email);
    let birthday = reader.supplied(F::Birthday);
    let address = reader.supplied(F::Address);
    let educational_attainment = reader.supplied(F::EducationalAttainment);
    let father_name = reader.supplied(F::FatherName);
    let mother_name = reader.supplied(F::MotherName);

    let church_position = reader.supplied_text(F::ChurchPosition);
    let organization_position = reader.supplied_text(F::OrganizationPosition);
    let cash_contribution = reader.supplied_text(F::CashContribution);
    let rice_contribution_kg = reader.supplied_text(F::RiceContribution);
    let in_kind_contribution = reader.supplied_text(F::InKindContribution);
    let plate = reader.supplied_flag(F::Plate);
    let spoon = reader.supplied_flag(F::Spoon);
    let glass = reader.supplied_flag(F::Glass);
    let beddings = reader.supplied_flag(F::Beddings);

    let errors = reader.into_errors();
    match (gender, membership) {
        (Some(gender), Some(membership)) if errors.is_empty() => {
            Ok(PartialRegistrationPayload {
                full_name,
                nickname,
                age,
                gender,
                contact_number,
                local_church,
                membership,
                attendance_count,
                expectations,
                email,
                birthday,
                address,
                educational_attainment,
                father_name,
                mother_name,
                church_position,
                organization_position,
                cash_contribution,
                rice_contribution_kg,
                in_kind_contribution,
                plate,
                spoon,
                glass,
                beddings,
            })
        }
        _ => Err(errors),
    }
}
