use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BloodGroup, RequestStatus, Urgency};

/// A hospital's posted need for blood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub blood_group: BloodGroup,
    pub units_needed: u32,
    pub urgency: Urgency,
    pub request_date: NaiveDate,
    pub status: RequestStatus,
    pub donors_responded: u32,
}
