use rusqlite::Connection;
use uuid::Uuid;

use super::{not_found, RegistryError};
use crate::db::repository;
use crate::directory::search_hospitals;
use crate::models::{BloodGroup, BloodInventory, Hospital, HospitalFilter};
use crate::validation::HospitalRegistration;

/// Registers a hospital. It starts unverified with every group at zero
/// units. The password only gates the form; credentials are not stored.
pub fn register_hospital(
    conn: &Connection,
    form: &HospitalRegistration,
) -> Result<Hospital, RegistryError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(RegistryError::Validation(errors));
    }

    let hospital = Hospital {
        id: Uuid::new_v4(),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        location: form.location.trim().to_string(),
        verified: false,
        inventory: BloodInventory::empty(),
    };
    let tx = conn.unchecked_transaction()?;
    repository::insert_hospital(&tx, &hospital)?;
    tx.commit()?;

    tracing::info!(hospital_id = %hospital.id, "Hospital registered");
    Ok(hospital)
}

pub fn get_hospital(conn: &Connection, id: &Uuid) -> Result<Hospital, RegistryError> {
    repository::get_hospital(conn, id)?.ok_or_else(|| not_found("hospital", id))
}

pub fn list_hospitals(
    conn: &Connection,
    filter: &HospitalFilter,
) -> Result<Vec<Hospital>, RegistryError> {
    Ok(repository::list_hospitals(conn, filter)?)
}

/// Admin hospital list, narrowed by name or location when `term` is non-blank.
pub fn browse_hospitals(
    conn: &Connection,
    filter: &HospitalFilter,
    term: Option<&str>,
) -> Result<Vec<Hospital>, RegistryError> {
    let hospitals = repository::list_hospitals(conn, filter)?;
    Ok(match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => search_hospitals(&hospitals, term).into_iter().cloned().collect(),
        None => hospitals,
    })
}

/// Sets the stock for one group and returns the updated inventory.
pub fn set_inventory(
    conn: &Connection,
    hospital_id: &Uuid,
    group: BloodGroup,
    units: u32,
) -> Result<BloodInventory, RegistryError> {
    if repository::get_hospital(conn, hospital_id)?.is_none() {
        return Err(not_found("hospital", hospital_id));
    }
    repository::set_inventory_units(conn, hospital_id, group, units)?;
    tracing::debug!(hospital_id = %hospital_id, blood_group = %group, units, "Inventory updated");
    Ok(repository::get_inventory(conn, hospital_id)?)
}

/// Admin approval.
pub fn verify_hospital(conn: &Connection, id: &Uuid) -> Result<(), RegistryError> {
    repository::set_hospital_verified(conn, id, true)?;
    tracing::info!(hospital_id = %id, "Hospital verified");
    Ok(())
}

/// Deletes a hospital, its inventory and every request it posted.
pub fn delete_hospital(conn: &Connection, id: &Uuid) -> Result<(), RegistryError> {
    let tx = conn.unchecked_transaction()?;
    let requests = repository::count_hospital_requests(&tx, id)?;
    repository::delete_hospital(&tx, id)?;
    tx.commit()?;

    tracing::info!(hospital_id = %id, requests_removed = requests, "Hospital deleted");
    Ok(())
}

pub fn total_units(inventory: &BloodInventory) -> u64 {
    inventory.total()
}
