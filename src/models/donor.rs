use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BloodGroup, Gender};
use crate::geo::Coordinates;

fn default_available() -> bool {
    true
}

/// A registered blood donor.
///
/// `coordinates` and `is_available` may be absent in imported records:
/// missing coordinates stay `None` (the directory filter decides how to
/// treat them), missing availability defaults to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub donation_count: u32,
    pub registration_date: NaiveDate,
}
