//! Registration field validators and form-level checks.
//!
//! Predicates never fail: invalid input is `false`. Form checks collect one
//! `FieldError` per offending field so callers can show inline messages.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{BloodGroup, Gender};

/// Indian mobile numbering plan: 10 digits, leading 6-9.
pub const DEFAULT_PHONE_PATTERN: &str = r"^[6-9][0-9]{9}$";

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_DONOR_AGE: u8 = 18;
pub const MAX_DONOR_AGE: u8 = 65;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").unwrap());

static DEFAULT_PHONE_RULE: LazyLock<PhoneRule> = LazyLock::new(PhoneRule::default);

/// Phone numbering-plan rule. The default is the national mobile plan;
/// deployments elsewhere supply their own pattern.
#[derive(Debug, Clone)]
pub struct PhoneRule {
    pattern: Regex,
}

impl PhoneRule {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, phone: &str) -> bool {
        self.pattern.is_match(phone)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for PhoneRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PHONE_PATTERN).unwrap(),
        }
    }
}

pub fn validate_phone(phone: &str) -> bool {
    DEFAULT_PHONE_RULE.matches(phone)
}

/// Presence of `@` and a dotted domain; not RFC 5322.
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Letters and whitespace only.
pub fn validate_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

// ═══════════════════════════════════════════
// Form-level validation
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Donor sign-up form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorRegistration {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub blood_group: Option<BloodGroup>,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub coordinates: Option<crate::geo::Coordinates>,
}

impl DonorRegistration {
    pub fn validate(&self) -> Vec<FieldError> {
        self.validate_with(&DEFAULT_PHONE_RULE)
    }

    pub fn validate_with(&self, phone_rule: &PhoneRule) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name required"));
        } else if !validate_name(&self.name) {
            errors.push(FieldError::new("name", "Name cannot contain numbers"));
        }
        if !(MIN_DONOR_AGE..=MAX_DONOR_AGE).contains(&self.age) {
            errors.push(FieldError::new("age", "Age must be between 18 and 65"));
        }
        if self.blood_group.is_none() {
            errors.push(FieldError::new("blood_group", "Blood group required"));
        }
        if !phone_rule.matches(&self.phone) {
            errors.push(FieldError::new("phone", "Valid phone required"));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !validate_email(email) {
                errors.push(FieldError::new("email", "Invalid email format"));
            }
        }
        if self.city.trim().is_empty() {
            errors.push(FieldError::new("city", "City required"));
        }

        errors
    }
}

/// Hospital sign-up form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub password: String,
    pub confirm_password: String,
    pub terms_accepted: bool,
}

impl HospitalRegistration {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Hospital name required"));
        } else if !validate_name(&self.name) {
            errors.push(FieldError::new("name", "Name cannot contain numbers"));
        }
        if !validate_email(&self.email) {
            errors.push(FieldError::new("email", "Valid email required"));
        }
        if self.phone.trim().is_empty() {
            errors.push(FieldError::new("phone", "Phone required"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password required"));
        } else if !validate_password(&self.password) {
            errors.push(FieldError::new("password", "Password must be at least 8 characters"));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }
        if !self.terms_accepted {
            errors.push(FieldError::new("terms_accepted", "Terms must be accepted"));
        }

        errors
    }
}
