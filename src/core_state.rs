//! Shared application state for the HTTP layer.
//!
//! One SQLite connection behind a `Mutex`, plus the loaded settings and the
//! rules derived from them. Handlers lock the connection for a single
//! synchronous registry call and release it before responding.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::{ConfigError, Settings};
use crate::db;
use crate::eligibility::{self, EligibilityPolicy};
use crate::validation::PhoneRule;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    conn: Mutex<Connection>,
    pub settings: Settings,
    phone_rule: PhoneRule,
    policy: EligibilityPolicy,
    /// Pins the calendar date; `None` reads the local clock.
    fixed_today: Option<NaiveDate>,
}

impl CoreState {
    pub fn new(conn: Connection, settings: Settings) -> Result<Self, CoreError> {
        let phone_rule = settings.phone_rule()?;
        let policy = settings.eligibility_policy();
        Ok(Self {
            conn: Mutex::new(conn),
            settings,
            phone_rule,
            policy,
            fixed_today: None,
        })
    }

    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &Path, settings: Settings) -> Result<Self, CoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Database opened");
        Self::new(conn, settings)
    }

    pub fn in_memory(settings: Settings) -> Result<Self, CoreError> {
        Self::new(db::open_memory_database()?, settings)
    }

    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// Lock the connection for one unit of work.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn phone_rule(&self) -> &PhoneRule {
        &self.phone_rule
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(eligibility::today)
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_state_is_migrated() {
        let state = CoreState::in_memory(Settings::default()).unwrap();
        let conn = state.db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 6);
    }

    #[test]
    fn rules_follow_settings() {
        let settings = Settings {
            eligibility_window_days: 56,
            phone_pattern: r"^\d{3}-\d{4}$".into(),
            ..Default::default()
        };
        let state = CoreState::in_memory(settings).unwrap();
        assert_eq!(state.policy().window_days, 56);
        assert!(state.phone_rule().matches("555-1234"));
    }

    #[test]
    fn bad_phone_pattern_fails_construction() {
        let settings = Settings {
            phone_pattern: "(".into(),
            ..Default::default()
        };
        assert!(matches!(
            CoreState::in_memory(settings),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn fixed_today_overrides_clock() {
        let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let state = CoreState::in_memory(Settings::default())
            .unwrap()
            .with_fixed_today(day);
        assert_eq!(state.today(), day);
    }

    #[test]
    fn file_database_opens() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::open(&dir.path().join("test.db"), Settings::default()).unwrap();
        assert!(state.db().is_ok());
    }
}
