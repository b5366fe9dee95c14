use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{date_column, enum_column, format_date, opt_date_column, uuid_column, Repository};
use crate::db::DatabaseError;
use crate::geo::Coordinates;
use crate::models::{Donor, DonorFilter};

const DONOR_COLUMNS: &str = "id, name, age, gender, blood_group, phone, email, address, city,
     state, pincode, emergency_contact, latitude, longitude, last_donation_date,
     is_available, donation_count, registration_date";

pub fn insert_donor(conn: &Connection, donor: &Donor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO donors (id, name, age, gender, blood_group, phone, email, address, city,
         state, pincode, emergency_contact, latitude, longitude, last_donation_date,
         is_available, donation_count, registration_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            donor.id.to_string(),
            donor.name,
            donor.age,
            donor.gender.as_str(),
            donor.blood_group.as_str(),
            donor.phone,
            donor.email,
            donor.address,
            donor.city,
            donor.state,
            donor.pincode,
            donor.emergency_contact,
            donor.coordinates.map(|c| c.lat),
            donor.coordinates.map(|c| c.lng),
            donor.last_donation_date.as_ref().map(format_date),
            donor.is_available as i32,
            donor.donation_count,
            format_date(&donor.registration_date),
        ],
    )?;
    Ok(())
}

pub fn get_donor(conn: &Connection, id: &Uuid) -> Result<Option<Donor>, DatabaseError> {
    let sql = format!("SELECT {DONOR_COLUMNS} FROM donors WHERE id = ?1");
    let donor = conn
        .query_row(&sql, params![id.to_string()], row_to_donor)
        .optional()?;
    Ok(donor)
}

/// Phone is the login key for donors.
pub fn get_donor_by_phone(conn: &Connection, phone: &str) -> Result<Option<Donor>, DatabaseError> {
    let sql = format!("SELECT {DONOR_COLUMNS} FROM donors WHERE phone = ?1");
    let donor = conn.query_row(&sql, params![phone], row_to_donor).optional()?;
    Ok(donor)
}

/// True if any donor already uses this phone or (when given) email.
pub fn donor_contact_exists(
    conn: &Connection,
    phone: &str,
    email: Option<&str>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM donors WHERE phone = ?1 OR (?2 IS NOT NULL AND email = ?2)",
        params![phone, email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Donors in registration order.
pub fn list_donors(conn: &Connection, filter: &DonorFilter) -> Result<Vec<Donor>, DatabaseError> {
    let mut sql = format!("SELECT {DONOR_COLUMNS} FROM donors WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(group) = filter.blood_group {
        params_vec.push(Box::new(group.as_str()));
        sql.push_str(&format!(" AND blood_group = ?{}", params_vec.len()));
    }
    if filter.available_only {
        sql.push_str(" AND is_available = 1");
    }
    sql.push_str(" ORDER BY rowid ASC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), row_to_donor)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Overwrites every mutable column of an existing donor.
pub fn update_donor(conn: &Connection, donor: &Donor) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE donors SET name = ?2, age = ?3, gender = ?4, blood_group = ?5, phone = ?6,
         email = ?7, address = ?8, city = ?9, state = ?10, pincode = ?11,
         emergency_contact = ?12, latitude = ?13, longitude = ?14, last_donation_date = ?15,
         is_available = ?16, donation_count = ?17
         WHERE id = ?1",
        params![
            donor.id.to_string(),
            donor.name,
            donor.age,
            donor.gender.as_str(),
            donor.blood_group.as_str(),
            donor.phone,
            donor.email,
            donor.address,
            donor.city,
            donor.state,
            donor.pincode,
            donor.emergency_contact,
            donor.coordinates.map(|c| c.lat),
            donor.coordinates.map(|c| c.lng),
            donor.last_donation_date.as_ref().map(format_date),
            donor.is_available as i32,
            donor.donation_count,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "donor".into(),
            id: donor.id.to_string(),
        });
    }
    Ok(())
}

/// Deletes the donor; donation records go with it (ON DELETE CASCADE).
pub fn delete_donor(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM donors WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "donor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_donors(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM donors", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn row_to_donor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Donor> {
    let lat: Option<f64> = row.get(12)?;
    let lng: Option<f64> = row.get(13)?;
    let is_available: i32 = row.get(15)?;

    Ok(Donor {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: enum_column(row, 3)?,
        blood_group: enum_column(row, 4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        city: row.get(8)?,
        state: row.get(9)?,
        pincode: row.get(10)?,
        emergency_contact: row.get(11)?,
        coordinates: lat.zip(lng).map(|(lat, lng)| Coordinates { lat, lng }),
        last_donation_date: opt_date_column(row, 14)?,
        is_available: is_available != 0,
        donation_count: row.get(16)?,
        registration_date: date_column(row, 17)?,
    })
}

/// `Repository` view over the donors table.
pub struct DonorRepo<'c> {
    conn: &'c Connection,
}

impl<'c> DonorRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl Repository<Donor, DonorFilter> for DonorRepo<'_> {
    fn insert(&self, entity: &Donor) -> Result<Uuid, DatabaseError> {
        insert_donor(self.conn, entity)?;
        Ok(entity.id)
    }

    fn get(&self, id: &Uuid) -> Result<Option<Donor>, DatabaseError> {
        get_donor(self.conn, id)
    }

    fn update(&self, entity: &Donor) -> Result<(), DatabaseError> {
        update_donor(self.conn, entity)
    }

    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_donor(self.conn, id)
    }

    fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>, DatabaseError> {
        list_donors(self.conn, filter)
    }
}
