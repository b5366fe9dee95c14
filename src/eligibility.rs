//! Donation eligibility: fixed interval between whole-blood donations.
//!
//! All computations are on calendar dates. Callers pass `today` explicitly;
//! the `*_today` helpers read the local clock.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minimum days between two whole-blood donations.
pub const ELIGIBILITY_WINDOW_DAYS: u32 = 90;

/// Eligibility rule parameterised by window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub window_days: u32,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            window_days: ELIGIBILITY_WINDOW_DAYS,
        }
    }
}

/// Snapshot shown on a donor's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityStatus {
    pub eligible: bool,
    pub next_eligible_date: Option<NaiveDate>,
    pub days_remaining: u32,
}

impl EligibilityPolicy {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    /// `None` when the donor has never donated.
    pub fn next_eligible_date(&self, last_donation: Option<NaiveDate>) -> Option<NaiveDate> {
        last_donation.map(|last| {
            last.checked_add_days(Days::new(u64::from(self.window_days)))
                .unwrap_or(NaiveDate::MAX)
        })
    }

    /// Eligible on the boundary day itself.
    pub fn is_eligible(&self, last_donation: Option<NaiveDate>, today: NaiveDate) -> bool {
        match self.next_eligible_date(last_donation) {
            None => true,
            Some(next) => today >= next,
        }
    }

    pub fn days_until_eligible(&self, last_donation: Option<NaiveDate>, today: NaiveDate) -> u32 {
        match self.next_eligible_date(last_donation) {
            None => 0,
            Some(next) => {
                let days = (next - today).num_days();
                u32::try_from(days.max(0)).unwrap_or(u32::MAX)
            }
        }
    }

    pub fn status(&self, last_donation: Option<NaiveDate>, today: NaiveDate) -> EligibilityStatus {
        EligibilityStatus {
            eligible: self.is_eligible(last_donation, today),
            next_eligible_date: self.next_eligible_date(last_donation),
            days_remaining: self.days_until_eligible(last_donation, today),
        }
    }
}

pub fn next_eligible_date(last_donation: Option<NaiveDate>) -> Option<NaiveDate> {
    EligibilityPolicy::default().next_eligible_date(last_donation)
}

pub fn is_eligible(last_donation: Option<NaiveDate>, today: NaiveDate) -> bool {
    EligibilityPolicy::default().is_eligible(last_donation, today)
}

pub fn days_until_eligible(last_donation: Option<NaiveDate>, today: NaiveDate) -> u32 {
    EligibilityPolicy::default().days_until_eligible(last_donation, today)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn is_eligible_today(last_donation: Option<NaiveDate>) -> bool {
    is_eligible(last_donation, today())
}

pub fn days_until_eligible_today(last_donation: Option<NaiveDate>) -> u32 {
    days_until_eligible(last_donation, today())
}

/// Badge earned by total donations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DonorTier {
    Bronze,
    Silver,
    Gold,
}

impl DonorTier {
    pub fn for_count(donation_count: u32) -> Self {
        match donation_count {
            10.. => DonorTier::Gold,
            5..=9 => DonorTier::Silver,
            _ => DonorTier::Bronze,
        }
    }
}
