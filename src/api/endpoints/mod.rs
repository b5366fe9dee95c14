//! API endpoint handlers.
//!
//! Handlers lock the shared connection, call one registry operation and
//! map its errors through `ApiError`.

pub mod compatibility;
pub mod donors;
pub mod eligibility;
pub mod health;
pub mod hospitals;
pub mod requests;
pub mod stats;
pub mod validate;
