use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::BloodGroup;

/// Units on hand per blood group. Always holds an entry for all 8 groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BloodInventory(BTreeMap<BloodGroup, u32>);

impl BloodInventory {
    /// Inventory with zero units of every group.
    pub fn empty() -> Self {
        Self(BloodGroup::ALL.iter().map(|g| (*g, 0)).collect())
    }

    pub fn units(&self, group: BloodGroup) -> u32 {
        self.0.get(&group).copied().unwrap_or(0)
    }

    pub fn set(&mut self, group: BloodGroup, units: u32) {
        self.0.insert(group, units);
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|u| u64::from(*u)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BloodGroup, u32)> + '_ {
        self.0.iter().map(|(g, u)| (*g, *u))
    }
}

impl Default for BloodInventory {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub verified: bool,
    #[serde(default)]
    pub inventory: BloodInventory,
}
