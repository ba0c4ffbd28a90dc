//! Donor-to-patient matching.
//!
//! Pipeline: Compatibility → Eligibility Ranking → Greedy Allocation → Persist

mod allocator;
mod compatibility;
mod ranker;

pub use allocator::*;
pub use compatibility::*;
pub use ranker::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::ConfigError;
use crate::db::{Database, DbError, DbResult};
use crate::models::{Assignment, Donor, Patient};

/// Matching errors.
#[derive(Error, Debug)]
pub enum MatchingError {
    #[error("Failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: DbError,
    },

    #[error("Invalid assignment config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

pub type MatchingResult<T> = Result<T, MatchingError>;

/// Where an allocation run reads patients and donors and writes assignments.
pub trait AssignmentStore {
    /// All patients, in the order they should be served.
    fn fetch_patients(&self) -> DbResult<Vec<Patient>>;

    /// Donors currently flagged available for donation.
    fn fetch_available_donors(&self) -> DbResult<Vec<Donor>>;

    /// Upsert an active (patient, donor) assignment.
    fn upsert_assignment(
        &self,
        patient_id: &str,
        donor_id: &str,
        assigned_at: DateTime<Utc>,
    ) -> DbResult<Assignment>;
}

impl AssignmentStore for Database {
    fn fetch_patients(&self) -> DbResult<Vec<Patient>> {
        self.list_patients()
    }

    fn fetch_available_donors(&self) -> DbResult<Vec<Donor>> {
        self.list_available_donors()
    }

    fn upsert_assignment(
        &self,
        patient_id: &str,
        donor_id: &str,
        assigned_at: DateTime<Utc>,
    ) -> DbResult<Assignment> {
        Database::upsert_assignment(self, patient_id, donor_id, assigned_at)
    }
}
