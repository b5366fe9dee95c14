//! Entity lifecycles for donors, hospitals and blood requests.
//!
//! Services validate input, apply registration defaults, and keep
//! multi-row changes (donation logging, cascading deletes) inside one
//! SQLite transaction. Filtering and eligibility decisions are delegated
//! to the pure rule modules.

pub mod donors;
pub mod hospitals;
pub mod requests;
pub mod stats;

pub use donors::*;
pub use hospitals::*;
pub use requests::*;
pub use stats::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::validation::FieldError;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Already registered: {0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        RegistryError::Database(DatabaseError::Sqlite(err))
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn not_found(entity_type: &str, id: &uuid::Uuid) -> RegistryError {
    RegistryError::Database(DatabaseError::NotFound {
        entity_type: entity_type.into(),
        id: id.to_string(),
    })
}
