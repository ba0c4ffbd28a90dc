//! Capacity-bounded greedy allocation of donors to patients.
//!
//! Patients are served once each, in store order. Every donor selected for
//! a patient leaves the run's pool immediately, so batches within one run
//! never share a donor. There is no backtracking.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::AssignmentConfig;
use crate::db::DbResult;
use crate::models::{Assignment, AssignmentOutcome, Donor, FailedAssignment, RankedDonor};

use super::{AssignmentStore, EligibilityRanker, MatchingError, MatchingResult};

/// Run-scoped pool of donors not yet handed out.
#[derive(Debug, Clone, Default)]
pub struct DonorPool {
    donors: Vec<Donor>,
}

impl DonorPool {
    pub fn new(donors: Vec<Donor>) -> Self {
        Self { donors }
    }

    pub fn len(&self) -> usize {
        self.donors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.donors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Donor> {
        self.donors.iter()
    }

    pub fn contains(&self, donor_id: &str) -> bool {
        self.donors.iter().any(|d| d.id == donor_id)
    }

    /// Remove a donor for the rest of the run. Returns false if absent.
    pub fn withdraw(&mut self, donor_id: &str) -> bool {
        let before = self.donors.len();
        self.donors.retain(|d| d.id != donor_id);
        self.donors.len() < before
    }
}

/// Greedy allocator over an [`AssignmentStore`].
pub struct DonorAllocator<'a, S: AssignmentStore> {
    store: &'a S,
    config: AssignmentConfig,
}

impl<'a, S: AssignmentStore> DonorAllocator<'a, S> {
    /// Create an allocator with the given run configuration.
    pub fn new(store: &'a S, config: AssignmentConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Run with the configured per-patient capacity.
    pub fn run(&self) -> MatchingResult<AssignmentOutcome> {
        self.assign_donors_to_patients(self.config.max_donors_per_patient)
    }

    /// Assign up to `max_donors_per_patient` donors to every patient.
    pub fn assign_donors_to_patients(
        &self,
        max_donors_per_patient: usize,
    ) -> MatchingResult<AssignmentOutcome> {
        self.assign_donors_to_patients_at(max_donors_per_patient, Utc::now())
    }

    /// Same as [`Self::assign_donors_to_patients`], with recency and
    /// `assigned_at` measured against `now`.
    ///
    /// Fetch failures abort the run before anything is written. Upsert
    /// failures are retried, then reported in `failed`; the run carries on.
    pub fn assign_donors_to_patients_at(
        &self,
        max_donors_per_patient: usize,
        now: DateTime<Utc>,
    ) -> MatchingResult<AssignmentOutcome> {
        self.config.validate()?;

        let patients = self
            .store
            .fetch_patients()
            .map_err(|source| MatchingError::Fetch {
                what: "patients",
                source,
            })?;
        let donors = self
            .store
            .fetch_available_donors()
            .map_err(|source| MatchingError::Fetch {
                what: "donors",
                source,
            })?;

        tracing::info!(
            patients = patients.len(),
            donors = donors.len(),
            max_donors_per_patient,
            "Starting donor assignment run"
        );

        let ranker = EligibilityRanker::new(self.config.recency_window_days, now);
        let mut pool = DonorPool::new(donors);
        let mut outcome = AssignmentOutcome::default();

        let mut seen = HashSet::with_capacity(patients.len());

        for patient in &patients {
            if !seen.insert(patient.id.as_str()) {
                tracing::debug!(patient_id = %patient.id, "Skipping repeated patient");
                continue;
            }

            let selected: Vec<RankedDonor> = ranker
                .rank(patient, pool.iter())
                .into_iter()
                .take(max_donors_per_patient)
                .collect();

            if selected.is_empty() && max_donors_per_patient > 0 {
                tracing::warn!(
                    patient_id = %patient.id,
                    blood_group = %patient.blood_group,
                    location = %patient.location,
                    "No compatible donors available"
                );
            }

            let mut assigned = Vec::with_capacity(selected.len());
            for ranked in selected {
                // Withdrawn even if persisting fails, so no later patient
                // in this run can be handed the same donor.
                pool.withdraw(&ranked.donor.id);

                match self.persist(&patient.id, &ranked.donor.id, now) {
                    Ok(_) => assigned.push(ranked),
                    Err(e) => {
                        tracing::warn!(
                            patient_id = %patient.id,
                            donor_id = %ranked.donor.id,
                            error = %e,
                            "Failed to persist assignment"
                        );
                        outcome.failed.push(FailedAssignment {
                            patient_id: patient.id.clone(),
                            donor_id: ranked.donor.id.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }

            tracing::debug!(
                patient_id = %patient.id,
                assigned = assigned.len(),
                pool_remaining = pool.len(),
                "Patient processed"
            );

            outcome.total_assignments += assigned.len();
            outcome.patients_processed += 1;
            outcome.processing_order.push(patient.id.clone());
            outcome.assigned.insert(patient.id.clone(), assigned);
        }

        tracing::info!(
            patients_processed = outcome.patients_processed,
            total_assignments = outcome.total_assignments,
            failed = outcome.failed.len(),
            "Donor assignment run completed"
        );

        Ok(outcome)
    }

    /// Upsert one pair, retrying up to the configured attempt count.
    fn persist(&self, patient_id: &str, donor_id: &str, now: DateTime<Utc>) -> DbResult<Assignment> {
        let mut attempt = 1;
        loop {
            match self.store.upsert_assignment(patient_id, donor_id, now) {
                Ok(assignment) => return Ok(assignment),
                Err(e) if attempt < self.config.persist_attempts => {
                    tracing::debug!(attempt, error = %e, "Retrying assignment upsert");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Convenience wrapper: run with default config and the given capacity.
pub fn assign_donors_to_patients<S: AssignmentStore>(
    store: &S,
    max_donors_per_patient: usize,
) -> MatchingResult<AssignmentOutcome> {
    DonorAllocator::new(store, AssignmentConfig::default())
        .assign_donors_to_patients(max_donors_per_patient)
}
