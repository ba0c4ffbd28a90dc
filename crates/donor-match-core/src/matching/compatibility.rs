//! Blood-group compatibility for red-cell transfusion.
//!
//! Recipient → acceptable donor groups:
//!
//! | Patient | Donors                              |
//! |---------|-------------------------------------|
//! | O-      | O-                                  |
//! | O+      | O-, O+                              |
//! | A-      | O-, A-                              |
//! | A+      | O-, O+, A-, A+                      |
//! | B-      | O-, B-                              |
//! | B+      | O-, O+, B-, B+                      |
//! | AB-     | O-, A-, B-, AB-                     |
//! | AB+     | all                                 |

use crate::models::BloodGroup;
use crate::models::BloodGroup::*;

/// Donor groups that can safely give to a patient of `recipient` group.
pub fn compatible_donor_groups(recipient: BloodGroup) -> &'static [BloodGroup] {
    match recipient {
        ONeg => &[ONeg],
        OPos => &[ONeg, OPos],
        ANeg => &[ONeg, ANeg],
        APos => &[ONeg, OPos, ANeg, APos],
        BNeg => &[ONeg, BNeg],
        BPos => &[ONeg, OPos, BNeg, BPos],
        AbNeg => &[ONeg, ANeg, BNeg, AbNeg],
        AbPos => &BloodGroup::ALL,
    }
}

/// Same as [`compatible_donor_groups`] for a stored string.
///
/// Unrecognised groups match no donors.
pub fn compatible_donor_groups_for(recipient: &str) -> &'static [BloodGroup] {
    match BloodGroup::parse(recipient) {
        Some(group) => compatible_donor_groups(group),
        None => {
            tracing::debug!(blood_group = recipient, "No compatibility entry for blood group");
            &[]
        }
    }
}

impl BloodGroup {
    /// Whether a patient of this group can receive from `donor`.
    pub fn can_receive_from(self, donor: BloodGroup) -> bool {
        compatible_donor_groups(self).contains(&donor)
    }

    /// Whether a donor of this group can give to `recipient`.
    pub fn can_donate_to(self, recipient: BloodGroup) -> bool {
        recipient.can_receive_from(self)
    }

    /// Recipient groups this donor group can give to.
    pub fn recipients(self) -> Vec<BloodGroup> {
        BloodGroup::ALL
            .iter()
            .copied()
            .filter(|r| self.can_donate_to(*r))
            .collect()
    }
}
