use serde::{Deserialize, Serialize};

/// Every field a registration carries, in export/display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegistrationField {
    FullName,
    Email,
    Nickname,
    Birthday,
    Age,
    Gender,
    Address,
    ContactNumber,
    EducationalAttainment,
    FatherName,
    MotherName,
    LocalChurch,
    Membership,
    ChurchPosition,
    OrganizationPosition,
    AttendanceCount,
    Expectations,
    CashContribution,
    RiceContribution,
    InKindContribution,
    Plate,
    Spoon,
    Glass,
    Beddings,
    PaymentStatus,
}

/// Constraint applied to a field's raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Required text of at least `min_chars` characters.
    Text {
        min_chars: usize,
        message: &'static str,
    },
    Email {
        message: &'static str,
    },
    Choice {
        options: &'static [&'static str],
        missing: &'static str,
    },
    OptionalText,
    /// Brought-items checkbox; only the literal `"true"` counts as checked.
    Flag,
    /// Never accepted from raw input.
    Managed,
}

impl RegistrationField {
    pub const fn ordered() -> [Self; 25] {
        [
            Self::FullName,
            Self::Email,
            Self::Nickname,
            Self::Birthday,
            Self::Age,
            Self::Gender,
            Self::Address,
            Self::ContactNumber,
            Self::EducationalAttainment,
            Self::FatherName,
            Self::MotherName,
            Self::LocalChurch,
            Self::Membership,
            Self::ChurchPosition,
            Self::OrganizationPosition,
            Self::AttendanceCount,
            Self::Expectations,
            Self::CashContribution,
            Self::RiceContribution,
            Self::InKindContribution,
            Self::Plate,
            Self::Spoon,
            Self::Glass,
            Self::Beddings,
            Self::PaymentStatus,
        ]
    }

    /// Key used in raw form input and in stored documents.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::FullName => "pangalan",
            Self::Email => "email",
            Self::Nickname => "palayaw",
            Self::Birthday => "kaarawan",
            Self::Age => "edad",
            Self::Gender => "kasarian",
            Self::Address => "tirahan",
            Self::ContactNumber => "contactNumber",
            Self::EducationalAttainment => "inabot",
            Self::FatherName => "tatay",
            Self::MotherName => "nanay",
            Self::LocalChurch => "localChurch",
            Self::Membership => "kasapian",
            Self::ChurchPosition => "posisyonIglesya",
            Self::OrganizationPosition => "posisyonOrganisasyon",
            Self::AttendanceCount => "ilangBeses",
            Self::Expectations => "mgaInaasahan",
            Self::CashContribution => "ambagCash",
            Self::RiceContribution => "ambagRice",
            Self::InKindContribution => "ambagInKinds",
            Self::Plate => "plato",
            Self::Spoon => "kutsara",
            Self::Glass => "baso",
            Self::Beddings => "beddings",
            Self::PaymentStatus => "paymentStatus",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "Pangalan (Full Name)",
            Self::Email => "Email",
            Self::Nickname => "Palayaw (Nickname)",
            Self::Birthday => "Kaarawan (Birthday)",
            Self::Age => "Edad (Age)",
            Self::Gender => "Kasarian (Gender)",
            Self::Address => "Tirahan (Address)",
            Self::ContactNumber => "Contact Number",
            Self::EducationalAttainment => "Inabot na Pag-aaral (Educational Attainment)",
            Self::FatherName => "Pangalan ng Tatay (Father's Name)",
            Self::MotherName => "Pangalan ng Nanay (Mother's Name)",
            Self::LocalChurch => "Iglesya Lokal (Local Church)",
            Self::Membership => "Kasapian (Membership)",
            Self::ChurchPosition => "Posisyon sa Iglesya Lokal (Church Position)",
            Self::OrganizationPosition => "Posisyon sa Organisasyon (Organization Position)",
            Self::AttendanceCount => "Ilang Beses Nakadalo (Times Attended)",
            Self::Expectations => "Inaasahan (Expectations)",
            Self::CashContribution => "Registration Fee (PHP)",
            Self::RiceContribution => "Rice (kg)",
            Self::InKindContribution => "In-Kinds",
            Self::Plate => "Plato",
            Self::Spoon => "Kutsara",
            Self::Glass => "Baso",
            Self::Beddings => "Beddings",
            Self::PaymentStatus => "Payment Status",
        }
    }

    pub fn parse(wire_name: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|field| field.wire_name() == wire_name)
    }

    pub const fn create_rule(self) -> FieldRule {
        match self {
            Self::FullName => text(2, "Kinakailangan ang buong pangalan."),
            Self::Email => FieldRule::Email {
                message: "Kinakailangan ang valid na email address.",
            },
            Self::Nickname => text(2, "Kinakailangan ang palayaw."),
            Self::Birthday => text(1, "Kinakailangan ang kaarawan."),
            Self::Age => text(1, "Kinakailangan ang edad."),
            Self::Gender => FieldRule::Choice {
                options: Gender::OPTIONS,
                missing: "Kailangan mong pumili ng kasarian.",
            },
            Self::Address => text(5, "Kinakailangan ang tirahan."),
            Self::ContactNumber => text(10, "Kinakailangan ang contact number."),
            Self::EducationalAttainment => text(2, "Kinakailangan ang inabot na pag-aaral."),
            Self::FatherName => text(2, "Kinakailangan ang pangalan ng tatay."),
            Self::MotherName => text(2, "Kinakailangan ang pangalan ng nanay."),
            Self::LocalChurch => text(2, "Kinakailangan ang lokal na simbahan."),
            Self::Membership => FieldRule::Choice {
                options: Membership::OPTIONS,
                missing: "Kailangan mong pumili ng kasapian.",
            },
            Self::AttendanceCount => text(
                1,
                "Kinakailangan ang sagot kung ilang beses nang nakadalo.",
            ),
            Self::Expectations => text(5, "Kinakailangan ang iyong mga inaasahan."),
            Self::ChurchPosition
            | Self::OrganizationPosition
            | Self::CashContribution
            | Self::RiceContribution
            | Self::InKindContribution => FieldRule::OptionalText,
            Self::Plate | Self::Spoon | Self::Glass | Self::Beddings => FieldRule::Flag,
            Self::PaymentStatus => FieldRule::Managed,
        }
    }

    /// The reduced subset an officer edit must always carry.
    pub const fn required_on_update(self) -> bool {
        matches!(
            self,
            Self::FullName
                | Self::Nickname
                | Self::Age
                | Self::Gender
                | Self::ContactNumber
                | Self::LocalChurch
                | Self::Membership
                | Self::AttendanceCount
                | Self::Expectations
        )
    }

    pub const fn is_flag(self) -> bool {
        matches!(self.create_rule(), FieldRule::Flag)
    }
}

const fn text(min_chars: usize, message: &'static str) -> FieldRule {
    FieldRule::Text { min_chars, message }
}

/// Closed set of values accepted for an enumerated field.
pub trait Choice: Sized + Copy {
    const OPTIONS: &'static [&'static str];

    fn parse(raw: &str) -> Option<Self>;

    fn as_str(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Lalaki,
    Babae,
}

impl Choice for Gender {
    const OPTIONS: &'static [&'static str] = &["Lalaki", "Babae"];

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Lalaki" => Some(Self::Lalaki),
            "Babae" => Some(Self::Babae),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Lalaki => "Lalaki",
            Self::Babae => "Babae",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Membership {
    Baptized,
    Professing,
}

impl Choice for Membership {
    const OPTIONS: &'static [&'static str] = &["Baptized", "Professing"];

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Baptized" => Some(Self::Baptized),
            "Professing" => Some(Self::Professing),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Baptized => "Baptized",
            Self::Professing => "Professing",
        }
    }
}

/// Payment mark set by officers. Anything other than `"paid"` reads as unpaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some("paid") => Self::Paid,
            _ => Self::Unpaid,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Paid => Self::Unpaid,
            Self::Unpaid => Self::Paid,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_parse() {
        for field in RegistrationField::ordered() {
            assert_eq!(RegistrationField::parse(field.wire_name()), Some(field));
        }
        assert_eq!(RegistrationField::parse("id"), None);
    }

    #[test]
    fn update_subset_matches_edit_form() {
        let required: Vec<&str> = RegistrationField::ordered()
            .into_iter()
            .filter(|field| field.required_on_update())
            .map(RegistrationField::wire_name)
            .collect();
        assert_eq!(
            required,
            vec![
                "pangalan",
                "palayaw",
                "edad",
                "kasarian",
                "contactNumber",
                "localChurch",
                "kasapian",
                "ilangBeses",
                "mgaInaasahan",
            ]
        );
    }

    #[test]
    fn payment_status_treats_unknown_values_as_unpaid() {
        assert_eq!(PaymentStatus::from_stored(Some("paid")), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_stored(Some("PAID")), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::from_stored(None), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::Paid.toggled().toggled(), PaymentStatus::Paid);
    }
}
