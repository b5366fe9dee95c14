use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{not_found, RegistryError};
use crate::db::repository;
use crate::directory::{filter_donors_with, SearchCriteria};
use crate::eligibility::EligibilityPolicy;
use crate::models::{
    BloodGroup, BloodRequest, Donor, DonorFilter, RequestFilter, RequestStatus, Urgency,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub hospital_id: Uuid,
    pub blood_group: BloodGroup,
    pub units_needed: u32,
    pub urgency: Urgency,
}

/// Posts an active request dated `today` with no responses yet.
pub fn post_request(
    conn: &Connection,
    new: NewRequest,
    today: NaiveDate,
) -> Result<BloodRequest, RegistryError> {
    if new.units_needed == 0 {
        return Err(RegistryError::InvalidInput(
            "units needed must be at least 1".into(),
        ));
    }
    if repository::get_hospital(conn, &new.hospital_id)?.is_none() {
        return Err(not_found("hospital", &new.hospital_id));
    }

    let request = BloodRequest {
        id: Uuid::new_v4(),
        hospital_id: new.hospital_id,
        blood_group: new.blood_group,
        units_needed: new.units_needed,
        urgency: new.urgency,
        request_date: today,
        status: RequestStatus::Active,
        donors_responded: 0,
    };
    repository::insert_request(conn, &request)?;

    tracing::info!(
        request_id = %request.id,
        hospital_id = %request.hospital_id,
        blood_group = %request.blood_group,
        urgency = %request.urgency,
        "Blood request posted"
    );
    Ok(request)
}

/// Editable request fields; `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestUpdate {
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub units_needed: Option<u32>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

pub fn update_request(
    conn: &Connection,
    id: &Uuid,
    update: RequestUpdate,
) -> Result<BloodRequest, RegistryError> {
    let mut request = get_request(conn, id)?;

    if let Some(units) = update.units_needed {
        if units == 0 {
            return Err(RegistryError::InvalidInput(
                "units needed must be at least 1".into(),
            ));
        }
        request.units_needed = units;
    }
    if let Some(group) = update.blood_group {
        request.blood_group = group;
    }
    if let Some(urgency) = update.urgency {
        request.urgency = urgency;
    }
    if let Some(status) = update.status {
        request.status = status;
    }
    repository::update_request(conn, &request)?;

    tracing::debug!(request_id = %request.id, status = %request.status, "Blood request updated");
    Ok(request)
}

pub fn get_request(conn: &Connection, id: &Uuid) -> Result<BloodRequest, RegistryError> {
    repository::get_request(conn, id)?.ok_or_else(|| not_found("blood_request", id))
}

/// A donor answers the call. Only active requests take responses; returns
/// the new response count.
pub fn respond_to_request(conn: &Connection, id: &Uuid) -> Result<u32, RegistryError> {
    let request = get_request(conn, id)?;
    if request.status != RequestStatus::Active {
        return Err(RegistryError::InvalidInput(format!(
            "request is {}",
            request.status
        )));
    }
    Ok(repository::increment_responses(conn, id)?)
}

pub fn delete_request(conn: &Connection, id: &Uuid) -> Result<(), RegistryError> {
    repository::delete_request(conn, id)?;
    tracing::info!(request_id = %id, "Blood request deleted");
    Ok(())
}

/// Requests for display: most urgent first, then newest. Ties keep
/// posting order.
pub fn request_board(
    conn: &Connection,
    filter: &RequestFilter,
) -> Result<Vec<BloodRequest>, RegistryError> {
    let mut requests = repository::list_requests(conn, filter)?;
    requests.sort_by(|a, b| {
        b.urgency
            .cmp(&a.urgency)
            .then_with(|| b.request_date.cmp(&a.request_date))
    });
    Ok(requests)
}

/// Donors who could answer a request: compatible with its group, marked
/// available, and past their eligibility window.
pub fn matching_donors(
    conn: &Connection,
    request_id: &Uuid,
    policy: &EligibilityPolicy,
    today: NaiveDate,
) -> Result<Vec<Donor>, RegistryError> {
    let request = get_request(conn, request_id)?;
    let donors = repository::list_donors(
        conn,
        &DonorFilter {
            blood_group: None,
            available_only: true,
        },
    )?;

    let criteria = SearchCriteria {
        recipient_group: Some(request.blood_group),
        available_only: true,
        ..Default::default()
    };
    let matches: Vec<Donor> = filter_donors_with(&donors, &criteria, policy, today)
        .into_iter()
        .map(|m| m.donor.clone())
        .collect();

    tracing::debug!(
        request_id = %request.id,
        blood_group = %request.blood_group,
        matched = matches.len(),
        "Matched donors to request"
    );
    Ok(matches)
}
