use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{date_column, enum_column, format_date, uuid_column, Repository};
use crate::db::DatabaseError;
use crate::models::{BloodRequest, RequestFilter, RequestStatus};

const REQUEST_COLUMNS: &str = "id, hospital_id, blood_group, units_needed, urgency,
     request_date, status, donors_responded";

pub fn insert_request(conn: &Connection, request: &BloodRequest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO blood_requests (id, hospital_id, blood_group, units_needed, urgency,
         request_date, status, donors_responded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            request.id.to_string(),
            request.hospital_id.to_string(),
            request.blood_group.as_str(),
            request.units_needed,
            request.urgency.as_str(),
            format_date(&request.request_date),
            request.status.as_str(),
            request.donors_responded,
        ],
    )?;
    Ok(())
}

pub fn get_request(conn: &Connection, id: &Uuid) -> Result<Option<BloodRequest>, DatabaseError> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE id = ?1");
    let request = conn
        .query_row(&sql, params![id.to_string()], row_to_request)
        .optional()?;
    Ok(request)
}

/// Requests in posting order.
pub fn list_requests(
    conn: &Connection,
    filter: &RequestFilter,
) -> Result<Vec<BloodRequest>, DatabaseError> {
    let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(hospital_id) = filter.hospital_id {
        params_vec.push(Box::new(hospital_id.to_string()));
        sql.push_str(&format!(" AND hospital_id = ?{}", params_vec.len()));
    }
    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
    }
    if let Some(group) = filter.blood_group {
        params_vec.push(Box::new(group.as_str()));
        sql.push_str(&format!(" AND blood_group = ?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY rowid ASC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), row_to_request)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_request(conn: &Connection, request: &BloodRequest) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE blood_requests SET blood_group = ?2, units_needed = ?3, urgency = ?4,
         status = ?5, donors_responded = ?6
         WHERE id = ?1",
        params![
            request.id.to_string(),
            request.blood_group.as_str(),
            request.units_needed,
            request.urgency.as_str(),
            request.status.as_str(),
            request.donors_responded,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "blood_request".into(),
            id: request.id.to_string(),
        });
    }
    Ok(())
}

/// Bumps the responded counter; returns the new value.
pub fn increment_responses(conn: &Connection, id: &Uuid) -> Result<u32, DatabaseError> {
    let count = conn
        .query_row(
            "UPDATE blood_requests SET donors_responded = donors_responded + 1
             WHERE id = ?1
             RETURNING donors_responded",
            params![id.to_string()],
            |row| row.get::<_, u32>(0),
        )
        .optional()?;
    count.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "blood_request".into(),
        id: id.to_string(),
    })
}

pub fn delete_request(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM blood_requests WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "blood_request".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_requests(
    conn: &Connection,
    status: Option<RequestStatus>,
) -> Result<u64, DatabaseError> {
    let count: i64 = match status {
        Some(status) => conn.query_row(
            "SELECT COUNT(*) FROM blood_requests WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM blood_requests", [], |row| row.get(0))?,
    };
    Ok(count.max(0) as u64)
}

pub fn count_hospital_requests(
    conn: &Connection,
    hospital_id: &Uuid,
) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blood_requests WHERE hospital_id = ?1",
        params![hospital_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

fn row_to_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<BloodRequest> {
    Ok(BloodRequest {
        id: uuid_column(row, 0)?,
        hospital_id: uuid_column(row, 1)?,
        blood_group: enum_column(row, 2)?,
        units_needed: row.get(3)?,
        urgency: enum_column(row, 4)?,
        request_date: date_column(row, 5)?,
        status: enum_column(row, 6)?,
        donors_responded: row.get(7)?,
    })
}

/// `Repository` view over blood requests.
pub struct RequestRepo<'c> {
    conn: &'c Connection,
}

impl<'c> RequestRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl Repository<BloodRequest, RequestFilter> for RequestRepo<'_> {
    fn insert(&self, entity: &BloodRequest) -> Result<Uuid, DatabaseError> {
        insert_request(self.conn, entity)?;
        Ok(entity.id)
    }

    fn get(&self, id: &Uuid) -> Result<Option<BloodRequest>, DatabaseError> {
        get_request(self.conn, id)
    }

    fn update(&self, entity: &BloodRequest) -> Result<(), DatabaseError> {
        update_request(self.conn, entity)
    }

    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_request(self.conn, id)
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<BloodRequest>, DatabaseError> {
        list_requests(self.conn, filter)
    }
}
