use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use super::{hospitals::get_hospital, RegistryError};
use crate::db::repository;
use crate::models::{RequestFilter, RequestStatus};

/// Network-wide totals for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_donors: u64,
    pub total_hospitals: u64,
    pub active_requests: u64,
    pub total_donations: u64,
}

pub fn admin_stats(conn: &Connection) -> Result<AdminStats, RegistryError> {
    Ok(AdminStats {
        total_donors: repository::count_donors(conn)?,
        total_hospitals: repository::count_hospitals(conn)?,
        active_requests: repository::count_requests(conn, Some(RequestStatus::Active))?,
        total_donations: repository::count_donation_records(conn)?,
    })
}

/// Per-hospital dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HospitalStats {
    pub active_requests: u64,
    pub fulfilled_requests: u64,
    pub total_requests: u64,
    pub donors_responded: u64,
    pub units_in_stock: u64,
}

pub fn hospital_stats(conn: &Connection, hospital_id: &Uuid) -> Result<HospitalStats, RegistryError> {
    let hospital = get_hospital(conn, hospital_id)?;
    let requests = repository::list_requests(
        conn,
        &RequestFilter {
            hospital_id: Some(*hospital_id),
            ..Default::default()
        },
    )?;

    let count_with =
        |status: RequestStatus| requests.iter().filter(|r| r.status == status).count() as u64;

    Ok(HospitalStats {
        active_requests: count_with(RequestStatus::Active),
        fulfilled_requests: count_with(RequestStatus::Fulfilled),
        total_requests: requests.len() as u64,
        donors_responded: requests.iter().map(|r| u64::from(r.donors_responded)).sum(),
        units_in_stock: hospital.inventory.total(),
    })
}
