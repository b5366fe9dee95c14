use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged donation. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub date: NaiveDate,
    pub location: String,
    pub units: u32,
    pub notes: Option<String>,
}
