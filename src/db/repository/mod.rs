//! Repository layer: entity-scoped database operations.
//!
//! Each sub-module holds the SQL for one aggregate as free functions over a
//! `&Connection`. The `*Repo` wrappers expose the same operations through the
//! `Repository` trait so callers can depend on the trait instead of SQLite.

mod donation;
mod donor;
mod hospital;
mod request;

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Type;
use uuid::Uuid;

use super::DatabaseError;

/// Base repository operations for any entity
pub trait Repository<T, F> {
    fn insert(&self, entity: &T) -> Result<Uuid, DatabaseError>;
    fn get(&self, id: &Uuid) -> Result<Option<T>, DatabaseError>;
    fn update(&self, entity: &T) -> Result<(), DatabaseError>;
    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError>;
    fn list(&self, filter: &F) -> Result<Vec<T>, DatabaseError>;
}

pub use donation::*;
pub use donor::*;
pub use hospital::*;
pub use request::*;

// ── Row conversion helpers ──────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn date_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_date_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn enum_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
