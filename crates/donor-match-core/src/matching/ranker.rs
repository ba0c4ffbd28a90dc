//! Eligibility ranking of compatible, local donors.
//!
//! Ordering:
//! 1. Recent donors (last donation within the window, boundary inclusive)
//! 2. Everyone else, including donors who have never donated
//!
//! Within a tier, fewer days since the last donation ranks first, then
//! higher lifetime donation count, then pool order.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::models::{DaysSince, Donor, Patient, RankedDonor, RecencyTier};

use super::compatibility::compatible_donor_groups_for;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between `last_donation` and `now`, floored.
pub fn days_since_last_donation(last_donation: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DaysSince {
    match last_donation {
        Some(last) => DaysSince::Days((now - last).num_seconds().div_euclid(SECONDS_PER_DAY)),
        None => DaysSince::Never,
    }
}

/// Ranks donors for a single patient against a point in time.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityRanker {
    recency_window_days: i64,
    now: DateTime<Utc>,
}

impl EligibilityRanker {
    /// Create a ranker for a run happening at `now`.
    pub fn new(recency_window_days: i64, now: DateTime<Utc>) -> Self {
        Self {
            recency_window_days,
            now,
        }
    }

    /// Which tier a day count falls into.
    pub fn tier(&self, days: DaysSince) -> RecencyTier {
        match days {
            DaysSince::Days(d) if d <= self.recency_window_days => RecencyTier::Recent,
            _ => RecencyTier::Other,
        }
    }

    /// Donors from `pool` that may give to `patient`, best first.
    ///
    /// A donor qualifies only if available, blood-group compatible, and
    /// located exactly where the patient is.
    pub fn rank<'d, I>(&self, patient: &Patient, pool: I) -> Vec<RankedDonor>
    where
        I: IntoIterator<Item = &'d Donor>,
    {
        let compatible = compatible_donor_groups_for(&patient.blood_group);
        if compatible.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<RankedDonor> = pool
            .into_iter()
            .filter(|donor| donor.available_for_donation)
            .filter(|donor| donor.location == patient.location)
            .filter(|donor| {
                donor
                    .blood_group()
                    .is_some_and(|group| compatible.contains(&group))
            })
            .map(|donor| {
                let days = days_since_last_donation(donor.last_donation, self.now);
                RankedDonor {
                    donor: donor.clone(),
                    days_since_last_donation: days,
                    tier: self.tier(days),
                }
            })
            .collect();

        ranked.sort_by_key(|r| {
            (
                r.tier == RecencyTier::Other,
                r.days_since_last_donation,
                Reverse(r.donor.total_donations),
            )
        });

        ranked
    }
}
