use serde::Serialize;

use super::schema::{Gender, Membership, PaymentStatus};
use crate::store::DocumentId;

/// Store-assigned registration identifier; never supplied by clients.
pub type RecordId = DocumentId;

/// Brought-items checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroughtItems {
    #[serde(rename = "plato")]
    pub plate: bool,
    #[serde(rename = "kutsara")]
    pub spoon: bool,
    #[serde(rename = "baso")]
    pub glass: bool,
    pub beddings: bool,
}

/// Fully validated registration as accepted from a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationPayload {
    #[serde(rename = "pangalan")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "palayaw")]
    pub nickname: String,
    #[serde(rename = "kaarawan")]
    pub birthday: String,
    #[serde(rename = "edad")]
    pub age: String,
    #[serde(rename = "kasarian")]
    pub gender: Gender,
    #[serde(rename = "tirahan")]
    pub address: String,
    #[serde(rename = "contactNumber")]
    pub contact_number: String,
    #[serde(rename = "inabot")]
    pub educational_attainment: String,
    #[serde(rename = "tatay")]
    pub father_name: String,
    #[serde(rename = "nanay")]
    pub mother_name: String,
    #[serde(rename = "localChurch")]
    pub local_church: String,
    #[serde(rename = "kasapian")]
    pub membership: Membership,
    #[serde(rename = "posisyonIglesya")]
    pub church_position: Option<String>,
    #[serde(rename = "posisyonOrganisasyon")]
    pub organization_position: Option<String>,
    #[serde(rename = "ilangBeses")]
    pub attendance_count: String,
    #[serde(rename = "mgaInaasahan")]
    pub expectations: String,
    #[serde(rename = "ambagCash")]
    pub cash_contribution: Option<String>,
    #[serde(rename = "ambagRice")]
    pub rice_contribution_kg: Option<String>,
    #[serde(rename = "ambagInKinds")]
    pub in_kind_contribution: Option<String>,
    #[serde(flatten)]
    pub brought_items: BroughtItems,
}

/// Officer edit. The edit form's subset is always present; everything else is
/// applied only when supplied. An empty optional text clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRegistrationPayload {
    pub full_name: String,
    pub nickname: String,
    pub age: String,
    pub gender: Gender,
    pub contact_number: String,
    pub local_church: String,
    pub membership: Membership,
    pub attendance_count: String,
    pub expectations: String,
    pub email: Option<String>,
    pub birthday: Option<String>,
    pub address: Option<String>,
    pub educational_attainment: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub church_position: Option<String>,
    pub organization_position: Option<String>,
    pub cash_contribution: Option<String>,
    pub rice_contribution_kg: Option<String>,
    pub in_kind_contribution: Option<String>,
    pub plate: Option<bool>,
    pub spoon: Option<bool>,
    pub glass: Option<bool>,
    pub beddings: Option<bool>,
}

/// A stored registration as officers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub payload: RegistrationPayload,
    #[serde(rename = "paymentStatus")]
    pub payment_status: PaymentStatus,
}
