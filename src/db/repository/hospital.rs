use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{enum_column, uuid_column, Repository};
use crate::db::DatabaseError;
use crate::models::{BloodGroup, BloodInventory, Hospital, HospitalFilter};

/// Inserts the hospital and one inventory row per blood group.
pub fn insert_hospital(conn: &Connection, hospital: &Hospital) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO hospitals (id, name, email, phone, location, verified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            hospital.id.to_string(),
            hospital.name,
            hospital.email,
            hospital.phone,
            hospital.location,
            hospital.verified as i32,
        ],
    )?;
    for (group, units) in hospital.inventory.iter() {
        set_inventory_units(conn, &hospital.id, group, units)?;
    }
    Ok(())
}

pub fn get_hospital(conn: &Connection, id: &Uuid) -> Result<Option<Hospital>, DatabaseError> {
    let hospital = conn
        .query_row(
            "SELECT id, name, email, phone, location, verified FROM hospitals WHERE id = ?1",
            params![id.to_string()],
            row_to_hospital,
        )
        .optional()?;

    match hospital {
        Some(mut h) => {
            h.inventory = get_inventory(conn, &h.id)?;
            Ok(Some(h))
        }
        None => Ok(None),
    }
}

pub fn list_hospitals(
    conn: &Connection,
    filter: &HospitalFilter,
) -> Result<Vec<Hospital>, DatabaseError> {
    let sql = if filter.verified_only {
        "SELECT id, name, email, phone, location, verified FROM hospitals
         WHERE verified = 1 ORDER BY rowid ASC"
    } else {
        "SELECT id, name, email, phone, location, verified FROM hospitals ORDER BY rowid ASC"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], row_to_hospital)?;

    let mut hospitals = Vec::new();
    for row in rows {
        let mut hospital = row?;
        hospital.inventory = get_inventory(conn, &hospital.id)?;
        hospitals.push(hospital);
    }
    Ok(hospitals)
}

/// Updates contact details and verification; inventory has its own setter.
pub fn update_hospital(conn: &Connection, hospital: &Hospital) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE hospitals SET name = ?2, email = ?3, phone = ?4, location = ?5, verified = ?6
         WHERE id = ?1",
        params![
            hospital.id.to_string(),
            hospital.name,
            hospital.email,
            hospital.phone,
            hospital.location,
            hospital.verified as i32,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "hospital".into(),
            id: hospital.id.to_string(),
        });
    }
    Ok(())
}

pub fn set_hospital_verified(
    conn: &Connection,
    id: &Uuid,
    verified: bool,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE hospitals SET verified = ?2 WHERE id = ?1",
        params![id.to_string(), verified as i32],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "hospital".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn set_inventory_units(
    conn: &Connection,
    hospital_id: &Uuid,
    group: BloodGroup,
    units: u32,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO hospital_inventory (hospital_id, blood_group, units)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (hospital_id, blood_group) DO UPDATE SET units = excluded.units",
        params![hospital_id.to_string(), group.as_str(), units],
    )?;
    Ok(())
}

pub fn get_inventory(conn: &Connection, hospital_id: &Uuid) -> Result<BloodInventory, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT blood_group, units FROM hospital_inventory WHERE hospital_id = ?1",
    )?;
    let rows = stmt.query_map(params![hospital_id.to_string()], |row| {
        Ok((enum_column::<BloodGroup>(row, 0)?, row.get::<_, u32>(1)?))
    })?;

    let mut inventory = BloodInventory::empty();
    for row in rows {
        let (group, units) = row?;
        inventory.set(group, units);
    }
    Ok(inventory)
}

/// Deletes the hospital. Inventory rows and blood requests cascade.
pub fn delete_hospital(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM hospitals WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "hospital".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_hospitals(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM hospitals", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

fn row_to_hospital(row: &rusqlite::Row<'_>) -> rusqlite::Result<Hospital> {
    let verified: i32 = row.get(5)?;
    Ok(Hospital {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        location: row.get(4)?,
        verified: verified != 0,
        inventory: BloodInventory::empty(),
    })
}

/// `Repository` view over hospitals (with inventory).
pub struct HospitalRepo<'c> {
    conn: &'c Connection,
}

impl<'c> HospitalRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl Repository<Hospital, HospitalFilter> for HospitalRepo<'_> {
    fn insert(&self, entity: &Hospital) -> Result<Uuid, DatabaseError> {
        insert_hospital(self.conn, entity)?;
        Ok(entity.id)
    }

    fn get(&self, id: &Uuid) -> Result<Option<Hospital>, DatabaseError> {
        get_hospital(self.conn, id)
    }

    fn update(&self, entity: &Hospital) -> Result<(), DatabaseError> {
        update_hospital(self.conn, entity)?;
        for (group, units) in entity.inventory.iter() {
            set_inventory_units(self.conn, &entity.id, group, units)?;
        }
        Ok(())
    }

    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_hospital(self.conn, id)
    }

    fn list(&self, filter: &HospitalFilter) -> Result<Vec<Hospital>, DatabaseError> {
        list_hospitals(self.conn, filter)
    }
}
