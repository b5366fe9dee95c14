use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{date_column, format_date, uuid_column};
use crate::db::DatabaseError;
use crate::models::DonationRecord;

/// Records are append-only; there is no update or single-record delete.
pub fn insert_donation_record(
    conn: &Connection,
    record: &DonationRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO donation_records (id, donor_id, date, location, units, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.donor_id.to_string(),
            format_date(&record.date),
            record.location,
            record.units,
            record.notes,
        ],
    )?;
    Ok(())
}

/// A donor's history, oldest first.
pub fn get_donation_history(
    conn: &Connection,
    donor_id: &Uuid,
) -> Result<Vec<DonationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, donor_id, date, location, units, notes
         FROM donation_records
         WHERE donor_id = ?1
         ORDER BY date ASC, rowid ASC",
    )?;
    let rows = stmt.query_map(params![donor_id.to_string()], row_to_record)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn count_donation_records(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM donation_records", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

pub fn count_donor_donations(conn: &Connection, donor_id: &Uuid) -> Result<u64, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM donation_records WHERE donor_id = ?1",
        params![donor_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<DonationRecord> {
    Ok(DonationRecord {
        id: uuid_column(row, 0)?,
        donor_id: uuid_column(row, 1)?,
        date: date_column(row, 2)?,
        location: row.get(3)?,
        units: row.get(4)?,
        notes: row.get(5)?,
    })
}
