//! ABO/Rh red-cell compatibility.

use std::str::FromStr;

use crate::models::BloodGroup;

use BloodGroup::*;

/// Donor groups whose red cells a recipient of `recipient` can receive.
pub fn compatible_donors(recipient: BloodGroup) -> &'static [BloodGroup] {
    match recipient {
        APos => &[APos, ANeg, OPos, ONeg],
        ANeg => &[ANeg, ONeg],
        BPos => &[BPos, BNeg, OPos, ONeg],
        BNeg => &[BNeg, ONeg],
        AbPos => &[APos, ANeg, BPos, BNeg, AbPos, AbNeg, OPos, ONeg],
        AbNeg => &[ANeg, BNeg, AbNeg, ONeg],
        OPos => &[OPos, ONeg],
        ONeg => &[ONeg],
    }
}

/// Lookup from an untyped group string. Unknown strings give an empty list.
pub fn compatible_donors_for(recipient: &str) -> Vec<BloodGroup> {
    match BloodGroup::from_str(recipient.trim()) {
        Ok(group) => compatible_donors(group).to_vec(),
        Err(_) => {
            tracing::debug!(recipient, "Unknown blood group in compatibility lookup");
            Vec::new()
        }
    }
}

pub fn can_donate_to(donor: BloodGroup, recipient: BloodGroup) -> bool {
    compatible_donors(recipient).contains(&donor)
}

/// Recipient groups that can receive from `donor`.
pub fn compatible_recipients(donor: BloodGroup) -> Vec<BloodGroup> {
    BloodGroup::ALL
        .iter()
        .copied()
        .filter(|recipient| can_donate_to(donor, *recipient))
        .collect()
}
