//! Donor family assignment models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Donor;

/// A persisted (patient, donor) pairing - one member of a patient's donor family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    /// Row UUID, stable across upserts of the same pair
    pub id: String,
    pub patient_id: String,
    pub donor_id: String,
    /// Timestamp of the most recent upsert (RFC 3339)
    pub assigned_at: String,
    /// Soft-delete flag; only external operations clear it
    pub is_active: bool,
}

/// Whole days since a donor's last donation.
///
/// `Never` orders after every finite count, so donors who have never
/// donated rank last but are never excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaysSince {
    Days(i64),
    Never,
}

impl DaysSince {
    /// Finite day count, if any.
    pub fn days(&self) -> Option<i64> {
        match self {
            DaysSince::Days(d) => Some(*d),
            DaysSince::Never => None,
        }
    }
}

/// Partition a ranked donor falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyTier {
    /// Donated within the recency window (boundary inclusive)
    Recent,
    /// Outside the window, or never donated
    Other,
}

/// A compatible, local donor with its ranking inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedDonor {
    pub donor: Donor,
    pub days_since_last_donation: DaysSince,
    pub tier: RecencyTier,
}

/// A (patient, donor) pair whose upsert failed after all attempts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedAssignment {
    pub patient_id: String,
    pub donor_id: String,
    /// Last error reported by the store
    pub error: String,
}

/// Result of one allocation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssignmentOutcome {
    /// Patient id → donors persisted for that patient, in rank order.
    /// Every processed patient has an entry, possibly empty.
    pub assigned: BTreeMap<String, Vec<RankedDonor>>,
    /// Patient ids in the order they were served
    pub processing_order: Vec<String>,
    /// Pairs that could not be persisted
    pub failed: Vec<FailedAssignment>,
    pub patients_processed: usize,
    pub total_assignments: usize,
}

impl AssignmentOutcome {
    /// Donors assigned to a patient in this run (empty if unknown).
    pub fn donors_for(&self, patient_id: &str) -> &[RankedDonor] {
        self.assigned
            .get(patient_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Donor ids assigned to a patient, in rank order.
    pub fn donor_ids_for(&self, patient_id: &str) -> Vec<&str> {
        self.donors_for(patient_id)
            .iter()
            .map(|r| r.donor.id.as_str())
            .collect()
    }

    /// Each served patient with its donors, first served first.
    pub fn in_processing_order(&self) -> impl Iterator<Item = (&str, &[RankedDonor])> {
        self.processing_order
            .iter()
            .map(move |id| (id.as_str(), self.donors_for(id)))
    }

    /// True when no upsert failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
