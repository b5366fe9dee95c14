use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{not_found, RegistryError};
use crate::db::repository::{self, Repository};
use crate::db::DatabaseError;
use crate::directory::{filter_donors_with, search_donors_admin, SearchCriteria};
use crate::eligibility::{DonorTier, EligibilityPolicy, EligibilityStatus};
use crate::geo::Coordinates;
use crate::models::{DonationRecord, Donor, DonorFilter};
use crate::validation::{validate_email, DonorRegistration, FieldError, PhoneRule};

/// Creates a donor from a validated sign-up form.
///
/// New donors start available, with no donations, registered `today`.
/// A phone or email already on file is rejected as a duplicate.
pub fn register_donor(
    conn: &Connection,
    form: &DonorRegistration,
    phone_rule: &PhoneRule,
    today: NaiveDate,
) -> Result<Donor, RegistryError> {
    let errors = form.validate_with(phone_rule);
    if !errors.is_empty() {
        return Err(RegistryError::Validation(errors));
    }
    let Some(blood_group) = form.blood_group else {
        return Err(RegistryError::InvalidInput("blood group required".into()));
    };

    let email = blank_to_none(form.email.as_deref());
    if repository::donor_contact_exists(conn, &form.phone, email.as_deref())? {
        return Err(RegistryError::Duplicate(
            "a donor with this phone or email already exists".into(),
        ));
    }

    let donor = Donor {
        id: Uuid::new_v4(),
        name: form.name.trim().to_string(),
        age: form.age,
        gender: form.gender,
        blood_group,
        phone: form.phone.clone(),
        email,
        address: blank_to_none(form.address.as_deref()),
        city: form.city.trim().to_string(),
        state: blank_to_none(form.state.as_deref()),
        pincode: blank_to_none(form.pincode.as_deref()),
        emergency_contact: blank_to_none(form.emergency_contact.as_deref()),
        coordinates: form.coordinates,
        last_donation_date: None,
        is_available: true,
        donation_count: 0,
        registration_date: today,
    };
    repository::insert_donor(conn, &donor)?;

    tracing::info!(donor_id = %donor.id, blood_group = %donor.blood_group, "Donor registered");
    Ok(donor)
}

/// Profile fields a donor may edit after registration. `None` leaves the
/// field unchanged; an empty string clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonorUpdate {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

pub fn update_donor(
    conn: &Connection,
    id: &Uuid,
    update: DonorUpdate,
    phone_rule: &PhoneRule,
) -> Result<Donor, RegistryError> {
    let mut donor = repository::get_donor(conn, id)?.ok_or_else(|| not_found("donor", id))?;

    let mut errors = Vec::new();
    if let Some(phone) = update.phone {
        if !phone_rule.matches(&phone) {
            errors.push(FieldError {
                field: "phone",
                message: "Valid phone required",
            });
        }
        donor.phone = phone;
    }
    if let Some(email) = update.email {
        donor.email = blank_to_none(Some(&email));
        if donor.email.as_deref().is_some_and(|e| !validate_email(e)) {
            errors.push(FieldError {
                field: "email",
                message: "Invalid email format",
            });
        }
    }
    if let Some(city) = update.city {
        if city.trim().is_empty() {
            errors.push(FieldError {
                field: "city",
                message: "City required",
            });
        }
        donor.city = city.trim().to_string();
    }
    if !errors.is_empty() {
        return Err(RegistryError::Validation(errors));
    }

    if let Some(address) = update.address {
        donor.address = blank_to_none(Some(&address));
    }
    if let Some(contact) = update.emergency_contact {
        donor.emergency_contact = blank_to_none(Some(&contact));
    }
    if let Some(available) = update.is_available {
        donor.is_available = available;
    }
    if let Some(coordinates) = update.coordinates {
        donor.coordinates = Some(coordinates);
    }

    repository::update_donor(conn, &donor).map_err(|e| {
        if is_unique_violation(&e) {
            RegistryError::Duplicate("phone or email belongs to another donor".into())
        } else {
            e.into()
        }
    })?;

    tracing::debug!(donor_id = %donor.id, "Donor profile updated");
    Ok(donor)
}

/// A donation to log against a donor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonation {
    pub date: NaiveDate,
    pub location: String,
    #[serde(default = "one_unit")]
    pub units: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

fn one_unit() -> u32 {
    1
}

/// Appends a donation record and moves the donor's last donation date and
/// count forward in the same transaction. A back-dated record never moves
/// `last_donation_date` backwards.
pub fn record_donation(
    conn: &Connection,
    donor_id: &Uuid,
    donation: NewDonation,
) -> Result<DonationRecord, RegistryError> {
    if donation.location.trim().is_empty() {
        return Err(RegistryError::Validation(vec![FieldError {
            field: "location",
            message: "Location required",
        }]));
    }
    if donation.units == 0 {
        return Err(RegistryError::Validation(vec![FieldError {
            field: "units",
            message: "Units must be at least 1",
        }]));
    }

    let tx = conn.unchecked_transaction()?;

    let mut donor =
        repository::get_donor(&tx, donor_id)?.ok_or_else(|| not_found("donor", donor_id))?;

    let record = DonationRecord {
        id: Uuid::new_v4(),
        donor_id: donor.id,
        date: donation.date,
        location: donation.location.trim().to_string(),
        units: donation.units,
        notes: blank_to_none(donation.notes.as_deref()),
    };
    repository::insert_donation_record(&tx, &record)?;

    donor.last_donation_date = Some(match donor.last_donation_date {
        Some(previous) => previous.max(record.date),
        None => record.date,
    });
    donor.donation_count = donor.donation_count.saturating_add(1);
    repository::update_donor(&tx, &donor)?;

    tx.commit()?;

    tracing::info!(
        donor_id = %donor.id,
        donation_count = donor.donation_count,
        "Donation recorded"
    );
    Ok(record)
}

/// Removes a donor together with their donation history.
pub fn delete_donor(conn: &Connection, id: &Uuid) -> Result<(), RegistryError> {
    let tx = conn.unchecked_transaction()?;
    let records = repository::count_donor_donations(&tx, id)?;
    repository::delete_donor(&tx, id)?;
    tx.commit()?;

    tracing::info!(donor_id = %id, records_removed = records, "Donor deleted");
    Ok(())
}

/// Donor login lookup.
pub fn find_donor_by_phone(conn: &Connection, phone: &str) -> Result<Option<Donor>, RegistryError> {
    Ok(repository::get_donor_by_phone(conn, phone.trim())?)
}

/// Admin donor list, narrowed by name or phone when `term` is non-blank.
pub fn browse_donors(conn: &Connection, term: Option<&str>) -> Result<Vec<Donor>, RegistryError> {
    let donors = repository::list_donors(conn, &DonorFilter::default())?;
    Ok(match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => search_donors_admin(&donors, term).into_iter().cloned().collect(),
        None => donors,
    })
}

pub fn donation_history(
    conn: &Connection,
    donor_id: &Uuid,
) -> Result<Vec<DonationRecord>, RegistryError> {
    if repository::get_donor(conn, donor_id)?.is_none() {
        return Err(not_found("donor", donor_id));
    }
    Ok(repository::get_donation_history(conn, donor_id)?)
}

/// Everything the donor dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct DonorProfile {
    pub donor: Donor,
    pub eligibility: EligibilityStatus,
    pub tier: DonorTier,
    pub history: Vec<DonationRecord>,
}

pub fn donor_profile(
    conn: &Connection,
    id: &Uuid,
    policy: &EligibilityPolicy,
    today: NaiveDate,
) -> Result<DonorProfile, RegistryError> {
    let donor = repository::get_donor(conn, id)?.ok_or_else(|| not_found("donor", id))?;
    let history = repository::get_donation_history(conn, id)?;
    Ok(DonorProfile {
        eligibility: policy.status(donor.last_donation_date, today),
        tier: DonorTier::for_count(donor.donation_count),
        donor,
        history,
    })
}

/// An owned search hit, for callers that outlive the loaded donor list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorHit {
    #[serde(flatten)]
    pub donor: Donor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Runs the directory filter over stored donors. Group and availability
/// are pushed down to the store; everything else is decided by the filter.
pub fn search_donors<R>(
    repo: &R,
    criteria: &SearchCriteria,
    policy: &EligibilityPolicy,
    today: NaiveDate,
) -> Result<Vec<DonorHit>, DatabaseError>
where
    R: Repository<Donor, DonorFilter>,
{
    let donors = repo.list(&DonorFilter {
        blood_group: criteria.blood_group,
        available_only: criteria.available_only,
    })?;

    Ok(filter_donors_with(&donors, criteria, policy, today)
        .into_iter()
        .map(|m| DonorHit {
            donor: m.donor.clone(),
            distance_km: m.distance_km,
        })
        .collect())
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_unique_violation(err: &DatabaseError) -> bool {
    matches!(
        err,
        DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
