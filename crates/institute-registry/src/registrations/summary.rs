use serde::Serialize;

use super::domain::RegistrationRecord;
use super::schema::{Membership, PaymentStatus};

/// Dashboard headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    pub total: usize,
    pub baptized: usize,
    pub professing: usize,
    pub paid: usize,
    pub unpaid: usize,
}

impl RegistrationSummary {
    pub fn from_records(records: &[RegistrationRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total += 1;
            match record.payload.membership {
                Membership::Baptized => summary.baptized += 1,
                Membership::Professing => summary.professing += 1,
            }
            match record.payment_status {
                PaymentStatus::Paid => summary.paid += 1,
                PaymentStatus::Unpaid => summary.unpaid += 1,
            }
            summary
        })
    }
}
