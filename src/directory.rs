//! Donor directory filter.
//!
//! Cheap attribute filters run first, then availability, then distance.
//! Distances are only computed when the caller supplies a reference point;
//! in that case the result is sorted nearest first, otherwise the input
//! order is kept.

use serde::{Deserialize, Serialize};

use crate::compatibility::can_donate_to;
use crate::eligibility::EligibilityPolicy;
use crate::geo::{distance_km, Coordinates};
use crate::models::{BloodGroup, Donor, Hospital};

use chrono::NaiveDate;

/// Default search radius in kilometers.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// How a distance-filtered search treats donors without coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCoordinates {
    /// Leave them out of radius results.
    #[default]
    Exclude,
    /// Place them at latitude 0, longitude 0.
    TreatAsOrigin,
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE_KM
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Exact donor group.
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    /// Keep donors whose group can donate to this recipient.
    #[serde(default)]
    pub recipient_group: Option<BloodGroup>,
    /// Case-insensitive substring of the donor's city.
    #[serde(default)]
    pub city: Option<String>,
    /// Case-insensitive substring of name, city or blood group.
    #[serde(default)]
    pub query: Option<String>,
    /// Require `is_available` and a passed eligibility window.
    #[serde(default)]
    pub available_only: bool,
    #[serde(default = "default_max_distance")]
    pub max_distance_km: f64,
    #[serde(default)]
    pub reference: Option<Coordinates>,
    #[serde(default)]
    pub missing_coordinates: MissingCoordinates,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            blood_group: None,
            recipient_group: None,
            city: None,
            query: None,
            available_only: false,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            reference: None,
            missing_coordinates: MissingCoordinates::default(),
        }
    }
}

/// A donor that passed the filter, with its distance when one was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorMatch<'a> {
    #[serde(flatten)]
    pub donor: &'a Donor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

pub fn filter_donors<'a>(
    donors: &'a [Donor],
    criteria: &SearchCriteria,
    today: NaiveDate,
) -> Vec<DonorMatch<'a>> {
    filter_donors_with(donors, criteria, &EligibilityPolicy::default(), today)
}

pub fn filter_donors_with<'a>(
    donors: &'a [Donor],
    criteria: &SearchCriteria,
    policy: &EligibilityPolicy,
    today: NaiveDate,
) -> Vec<DonorMatch<'a>> {
    let city = non_empty_lower(criteria.city.as_deref());
    let query = non_empty_lower(criteria.query.as_deref());

    let candidates = donors
        .iter()
        .filter(|d| criteria.blood_group.map_or(true, |g| d.blood_group == g))
        .filter(|d| {
            criteria
                .recipient_group
                .map_or(true, |r| can_donate_to(d.blood_group, r))
        })
        .filter(|d| city.as_deref().map_or(true, |c| d.city.to_lowercase().contains(c)))
        .filter(|d| query.as_deref().map_or(true, |q| matches_query(d, q)))
        .filter(|d| {
            !criteria.available_only
                || (d.is_available && policy.is_eligible(d.last_donation_date, today))
        });

    let Some(reference) = criteria.reference else {
        return candidates
            .map(|donor| DonorMatch {
                donor,
                distance_km: None,
            })
            .collect();
    };

    let mut located: Vec<DonorMatch<'a>> = candidates
        .filter_map(|donor| {
            let position = match (donor.coordinates, criteria.missing_coordinates) {
                (Some(c), _) => c,
                (None, MissingCoordinates::TreatAsOrigin) => Coordinates::ORIGIN,
                (None, MissingCoordinates::Exclude) => return None,
            };
            let distance = distance_km(reference, position);
            // NaN fails this comparison and drops out.
            (distance <= criteria.max_distance_km).then_some(DonorMatch {
                donor,
                distance_km: Some(distance),
            })
        })
        .collect();

    located.sort_by(|a, b| {
        let a = a.distance_km.unwrap_or(f64::INFINITY);
        let b = b.distance_km.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });

    tracing::debug!(
        candidates = donors.len(),
        matched = located.len(),
        radius_km = criteria.max_distance_km,
        "Distance-filtered donor search"
    );

    located
}

fn non_empty_lower(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn matches_query(donor: &Donor, query: &str) -> bool {
    donor.name.to_lowercase().contains(query)
        || donor.city.to_lowercase().contains(query)
        || donor.blood_group.as_str().to_lowercase().contains(query)
}

/// Distinct non-empty cities, sorted.
pub fn cities(donors: &[Donor]) -> Vec<String> {
    let mut cities: Vec<String> = donors
        .iter()
        .map(|d| d.city.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();
    cities.sort();
    cities.dedup();
    cities
}

/// Admin user search: name (case-insensitive) or phone substring.
pub fn search_donors_admin<'a>(donors: &'a [Donor], term: &str) -> Vec<&'a Donor> {
    let lower = term.to_lowercase();
    donors
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&lower) || d.phone.contains(term))
        .collect()
}

/// Admin hospital search: name or location, case-insensitive.
pub fn search_hospitals<'a>(hospitals: &'a [Hospital], term: &str) -> Vec<&'a Hospital> {
    let lower = term.to_lowercase();
    hospitals
        .iter()
        .filter(|h| {
            h.name.to_lowercase().contains(&lower) || h.location.to_lowercase().contains(&lower)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodInventory, Gender};
    use chrono::Days;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn donor(name: &str, group: BloodGroup, city: &str, coords: Option<(f64, f64)>) -> Donor {
        Donor {
            id: Uuid::new_v4(),
            name: name.into(),
            age: 30,
            gender: Gender::Other,
            blood_group: group,
            phone: "9876543210".into(),
            email: None,
            address: None,
            city: city.into(),
            state: None,
            pincode: None,
            emergency_contact: None,
            coordinates: coords.map(|(lat, lng)| Coordinates::new(lat, lng)),
            last_donation_date: None,
            is_available: true,
            donation_count: 0,
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn names(matches: &[DonorMatch<'_>]) -> Vec<String> {
        matches.iter().map(|m| m.donor.name.clone()).collect()
    }

    // 0.009 degrees of latitude is almost exactly 1 km.
    fn km_north(base: (f64, f64), km: f64) -> (f64, f64) {
        (base.0 + km * 0.008_993_2, base.1)
    }

    const DELHI: (f64, f64) = (28.6139, 77.2090);

    fn directory() -> Vec<Donor> {
        vec![
            donor("Ravi Kumar", BloodGroup::OPos, "New Delhi", Some(km_north(DELHI, 5.0))),
            donor("Meera Shah", BloodGroup::ANeg, "Mumbai", Some((19.0760, 72.8777))),
            donor("Arjun Rao", BloodGroup::OPos, "Delhi Cantt", Some(km_north(DELHI, 1.0))),
            donor("Kavya Iyer", BloodGroup::BPos, "new delhi", Some(km_north(DELHI, 10.0))),
            donor("Sameer Ali", BloodGroup::ONeg, "Pune", None),
        ]
    }

    #[test]
    fn no_criteria_keeps_insertion_order() {
        let donors = directory();
        let result = filter_donors(&donors, &SearchCriteria::default(), today());
        assert_eq!(
            names(&result),
            vec!["Ravi Kumar", "Meera Shah", "Arjun Rao", "Kavya Iyer", "Sameer Ali"]
        );
        assert!(result.iter().all(|m| m.distance_km.is_none()));
    }

    #[test]
    fn blood_group_is_exact() {
        let donors = directory();
        let criteria = SearchCriteria {
            blood_group: Some(BloodGroup::OPos),
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(names(&result), vec!["Ravi Kumar", "Arjun Rao"]);
    }

    #[test]
    fn city_is_case_insensitive_substring() {
        let donors = directory();
        let criteria = SearchCriteria {
            city: Some("DELHI".into()),
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(names(&result), vec!["Ravi Kumar", "Arjun Rao", "Kavya Iyer"]);
    }

    #[test]
    fn blank_city_is_no_filter() {
        let donors = directory();
        let criteria = SearchCriteria {
            city: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(filter_donors(&donors, &criteria, today()).len(), donors.len());
    }

    #[test]
    fn free_text_matches_name_city_or_group() {
        let donors = directory();
        let by_name = SearchCriteria {
            query: Some("meera".into()),
            ..Default::default()
        };
        assert_eq!(names(&filter_donors(&donors, &by_name, today())), vec!["Meera Shah"]);

        let by_group = SearchCriteria {
            query: Some("o-".into()),
            ..Default::default()
        };
        assert_eq!(names(&filter_donors(&donors, &by_group, today())), vec!["Sameer Ali"]);
    }

    #[test]
    fn recipient_group_keeps_compatible_donors() {
        let donors = directory();
        let criteria = SearchCriteria {
            recipient_group: Some(BloodGroup::ONeg),
            ..Default::default()
        };
        assert_eq!(names(&filter_donors(&donors, &criteria, today())), vec!["Sameer Ali"]);
    }

    #[test]
    fn available_only_requires_flag_and_eligibility() {
        let mut donors = directory();
        donors[0].is_available = false;
        donors[1].last_donation_date = today().checked_sub_days(Days::new(30));
        donors[2].last_donation_date = today().checked_sub_days(Days::new(90));

        let criteria = SearchCriteria {
            available_only: true,
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(names(&result), vec!["Arjun Rao", "Kavya Iyer", "Sameer Ali"]);
    }

    #[test]
    fn reference_sorts_nearest_first() {
        let donors = directory();
        let criteria = SearchCriteria {
            reference: Some(Coordinates::new(DELHI.0, DELHI.1)),
            max_distance_km: 50.0,
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(names(&result), vec!["Arjun Rao", "Ravi Kumar", "Kavya Iyer"]);

        let distances: Vec<f64> = result.iter().map(|m| m.distance_km.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] < w[1]));
        assert!((distances[0] - 1.0).abs() < 0.01);
        assert!((distances[1] - 5.0).abs() < 0.01);
        assert!((distances[2] - 10.0).abs() < 0.01);
    }

    #[test]
    fn radius_excludes_far_donors() {
        let donors = directory();
        let criteria = SearchCriteria {
            reference: Some(Coordinates::new(DELHI.0, DELHI.1)),
            max_distance_km: 6.0,
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(names(&result), vec!["Arjun Rao", "Ravi Kumar"]);
    }

    #[test]
    fn zero_radius_includes_donor_at_reference() {
        let donors = vec![donor("Here", BloodGroup::APos, "Pune", Some((18.52, 73.85)))];
        let criteria = SearchCriteria {
            reference: Some(Coordinates::new(18.52, 73.85)),
            max_distance_km: 0.0,
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].distance_km, Some(0.0));
    }

    #[test]
    fn missing_coordinates_excluded_by_default() {
        let donors = directory();
        let criteria = SearchCriteria {
            reference: Some(Coordinates::ORIGIN),
            max_distance_km: 1.0,
            ..Default::default()
        };
        assert!(filter_donors(&donors, &criteria, today()).is_empty());
    }

    #[test]
    fn missing_coordinates_as_origin() {
        let donors = directory();
        let criteria = SearchCriteria {
            reference: Some(Coordinates::ORIGIN),
            max_distance_km: 1.0,
            missing_coordinates: MissingCoordinates::TreatAsOrigin,
            ..Default::default()
        };
        let result = filter_donors(&donors, &criteria, today());
        assert_eq!(names(&result), vec!["Sameer Ali"]);
    }

    #[test]
    fn nan_coordinates_drop_out() {
        let donors = vec![
            donor("Broken", BloodGroup::APos, "Pune", Some((f64::NAN, 73.85))),
            donor("Fine", BloodGroup::APos, "Pune", Some((18.52, 73.85))),
        ];
        let criteria = SearchCriteria {
            reference: Some(Coordinates::new(18.52, 73.85)),
            ..Default::default()
        };
        assert_eq!(names(&filter_donors(&donors, &criteria, today())), vec!["Fine"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut donors = directory();
        donors[3].last_donation_date = today().checked_sub_days(Days::new(10));
        let criteria = SearchCriteria {
            city: Some("delhi".into()),
            available_only: true,
            reference: Some(Coordinates::new(DELHI.0, DELHI.1)),
            max_distance_km: 20.0,
            ..Default::default()
        };

        let first: Vec<Donor> = filter_donors(&donors, &criteria, today())
            .into_iter()
            .map(|m| m.donor.clone())
            .collect();
        let second: Vec<Donor> = filter_donors(&first, &criteria, today())
            .into_iter()
            .map(|m| m.donor.clone())
            .collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn city_list_is_distinct_and_sorted() {
        let mut donors = directory();
        donors.push(donor("Extra", BloodGroup::APos, "Pune", None));
        donors.push(donor("Blank", BloodGroup::APos, "", None));
        assert_eq!(
            cities(&donors),
            vec!["Delhi Cantt", "Mumbai", "New Delhi", "Pune", "new delhi"]
        );
    }

    #[test]
    fn admin_searches() {
        let mut donors = directory();
        donors[1].phone = "9123456780".into();
        assert_eq!(search_donors_admin(&donors, "KAVYA").len(), 1);
        assert_eq!(search_donors_admin(&donors, "91234").len(), 1);

        let hospitals = vec![Hospital {
            id: Uuid::new_v4(),
            name: "City General Hospital".into(),
            email: "city@hospital.com".into(),
            phone: "1234567890".into(),
            location: "Downtown, Metro City".into(),
            verified: true,
            inventory: BloodInventory::empty(),
        }];
        assert_eq!(search_hospitals(&hospitals, "downtown").len(), 1);
        assert_eq!(search_hospitals(&hospitals, "general").len(), 1);
        assert!(search_hospitals(&hospitals, "westside").is_empty());
    }
}
