use uuid::Uuid;

use super::enums::{BloodGroup, RequestStatus};

#[derive(Debug, Default)]
pub struct DonorFilter {
    pub blood_group: Option<BloodGroup>,
    pub available_only: bool,
}

#[derive(Debug, Default)]
pub struct HospitalFilter {
    pub verified_only: bool,
}

#[derive(Debug, Default)]
pub struct RequestFilter {
    pub hospital_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
    pub blood_group: Option<BloodGroup>,
}
