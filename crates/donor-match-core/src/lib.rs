//! Donor-Match Core Library
//!
//! Local-first donor family assignment for thalassemia patients, plus the
//! transfusion-frequency estimator used on the patient health screen.
//!
//! # Architecture
//!
//! ```text
//!   patients ─┐                    ┌─ donors (available only)
//!             ▼                    ▼
//!        ┌──────────────────────────────┐
//!        │   run-scoped donor pool      │
//!        └──────────────┬───────────────┘
//!                       │  for each patient, in store order
//!                       ▼
//!        Compatibility (ABO/Rh) ∧ same location
//!                       │
//!                       ▼
//!        Ranking: recent (≤ 180 days) → other, by days since donation
//!                       │
//!                       ▼
//!        take max_donors_per_patient, withdraw from pool
//!                       │
//!                       ▼
//!        upsert donor_families (patient, donor) ── failures collected
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer (patients, donors, donor families)
//! - [`models`]: Domain types (Patient, Donor, Assignment, etc.)
//! - [`matching`]: Compatibility, eligibility ranking, greedy allocation
//! - [`transfusion`]: Rule-based transfusion-frequency estimator
//! - [`config`]: Assignment run configuration

pub mod config;
pub mod db;
pub mod logging;
pub mod matching;
pub mod models;
pub mod transfusion;

// Re-export commonly used types
pub use config::AssignmentConfig;
pub use db::Database;
pub use matching::{AssignmentStore, DonorAllocator, DonorPool, EligibilityRanker};
pub use models::{
    Assignment, AssignmentOutcome, BloodGroup, ClinicalProfile, Confidence, Donor, Patient,
    RankedDonor, TransfusionRecommendation,
};
pub use transfusion::recommend_transfusion_frequency;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DonorMatchError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Assignment error: {0}")]
    AssignmentError(String),
}

impl From<db::DbError> for DonorMatchError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => DonorMatchError::NotFound(what),
            other => DonorMatchError::DatabaseError(other.to_string()),
        }
    }
}

impl From<matching::MatchingError> for DonorMatchError {
    fn from(e: matching::MatchingError) -> Self {
        DonorMatchError::AssignmentError(e.to_string())
    }
}

impl From<config::ConfigError> for DonorMatchError {
    fn from(e: config::ConfigError) -> Self {
        DonorMatchError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DonorMatchError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DonorMatchError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<DonorMatchCore>, DonorMatchError> {
    let db = Database::open(&path)?;
    Ok(DonorMatchCore::wrap(db, AssignmentConfig::default()))
}

/// Open a database with an assignment config given as JSON.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<DonorMatchCore>, DonorMatchError> {
    let config = AssignmentConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    Ok(DonorMatchCore::wrap(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<DonorMatchCore>, DonorMatchError> {
    let db = Database::open_in_memory()?;
    Ok(DonorMatchCore::wrap(db, AssignmentConfig::default()))
}

/// Install the tracing subscriber. Returns false if one was already set.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init_tracing(&filter)
}

/// Donor blood groups that can give to a patient of `blood_group`.
#[uniffi::export]
pub fn compatible_donor_groups(blood_group: String) -> Vec<String> {
    matching::compatible_donor_groups_for(&blood_group)
        .iter()
        .map(|g| g.as_str().to_string())
        .collect()
}

/// Estimate a transfusion interval from a clinical profile.
#[uniffi::export]
pub fn estimate_transfusion_frequency(profile: FfiClinicalProfile) -> FfiTransfusionRecommendation {
    recommend_transfusion_frequency(&profile.into()).into()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DonorMatchCore {
    db: Arc<Mutex<Database>>,
    config: AssignmentConfig,
}

impl DonorMatchCore {
    fn wrap(db: Database, config: AssignmentConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }
}

#[uniffi::export]
impl DonorMatchCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create or update a patient.
    pub fn upsert_patient(&self, patient: FfiPatient) -> Result<(), DonorMatchError> {
        let db = self.db.lock()?;
        db.upsert_patient(&patient.into())?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, DonorMatchError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List all patients in registration order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, DonorMatchError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Donor Operations
    // =========================================================================

    /// Create or update a donor.
    pub fn upsert_donor(&self, donor: FfiDonor) -> Result<(), DonorMatchError> {
        let donor = Donor::try_from(donor)?;
        let db = self.db.lock()?;
        db.upsert_donor(&donor)?;
        Ok(())
    }

    /// Get a donor by ID.
    pub fn get_donor(&self, id: String) -> Result<Option<FfiDonor>, DonorMatchError> {
        let db = self.db.lock()?;
        let donor = db.get_donor(&id)?;
        Ok(donor.map(|d| d.into()))
    }

    /// Mark a donor available or unavailable for assignment.
    pub fn set_donor_availability(
        &self,
        id: String,
        available: bool,
    ) -> Result<bool, DonorMatchError> {
        let db = self.db.lock()?;
        Ok(db.set_donor_availability(&id, available)?)
    }

    /// Record a completed donation (`donated_at` as RFC 3339, now if omitted).
    pub fn record_donation(
        &self,
        donor_id: String,
        donated_at: Option<String>,
    ) -> Result<(), DonorMatchError> {
        let at = match donated_at {
            Some(ts) => parse_ffi_timestamp(&ts)?,
            None => chrono::Utc::now(),
        };
        let db = self.db.lock()?;
        db.record_donation(&donor_id, at)?;
        Ok(())
    }

    // =========================================================================
    // Assignment Operations
    // =========================================================================

    /// Run the donor assignment over every patient.
    pub fn assign_donors_to_patients(
        &self,
        max_donors_per_patient: u32,
    ) -> Result<FfiAssignmentOutcome, DonorMatchError> {
        let db = self.db.lock()?;
        let allocator = DonorAllocator::new(&*db, self.config.clone());
        let outcome = allocator.assign_donors_to_patients(max_donors_per_patient as usize)?;
        Ok(outcome.into())
    }

    /// Run the donor assignment with the configured capacity.
    pub fn run_assignment(&self) -> Result<FfiAssignmentOutcome, DonorMatchError> {
        let db = self.db.lock()?;
        let outcome = DonorAllocator::new(&*db, self.config.clone()).run()?;
        Ok(outcome.into())
    }

    /// Active donor family for a patient.
    pub fn get_donor_family(&self, patient_id: String) -> Result<Vec<FfiDonor>, DonorMatchError> {
        let db = self.db.lock()?;
        let donors = db.list_family_donors(&patient_id)?;
        Ok(donors.into_iter().map(|d| d.into()).collect())
    }

    /// Remove one donor from a patient's family.
    pub fn deactivate_assignment(
        &self,
        patient_id: String,
        donor_id: String,
    ) -> Result<bool, DonorMatchError> {
        let db = self.db.lock()?;
        Ok(db.deactivate_assignment(&patient_id, &donor_id)?)
    }

    /// Clear a patient's family ahead of reassignment.
    pub fn deactivate_family(&self, patient_id: String) -> Result<u32, DonorMatchError> {
        let db = self.db.lock()?;
        Ok(db.deactivate_family(&patient_id)? as u32)
    }

    // =========================================================================
    // Transfusion Planning
    // =========================================================================

    /// Recommend a transfusion interval for a stored patient.
    pub fn recommend_transfusion_frequency(
        &self,
        patient_id: String,
    ) -> Result<FfiTransfusionRecommendation, DonorMatchError> {
        let db = self.db.lock()?;
        let patient = db
            .get_patient(&patient_id)?
            .ok_or_else(|| DonorMatchError::NotFound(format!("patient {}", patient_id)))?;
        Ok(recommend_transfusion_frequency(&patient.clinical).into())
    }
}

fn parse_ffi_timestamp(value: &str) -> Result<chrono::DateTime<chrono::Utc>, DonorMatchError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .map_err(|e| DonorMatchError::InvalidInput(format!("Bad timestamp {}: {}", value, e)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe clinical profile.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiClinicalProfile {
    pub thalassemia_type: Option<String>,
    pub recent_pre_transfusion_hb: Option<String>,
    pub symptoms_between_transfusions: Option<String>,
    pub transfusion_frequency_past_6_months: Option<String>,
    pub usual_transfusion_hb_level: Option<String>,
    pub organ_issues_history: Option<String>,
    pub manual_transfusion_frequency: Option<String>,
    pub poor_growth_history: bool,
    pub bone_deformities: bool,
    pub recurrent_infections: bool,
}

impl From<ClinicalProfile> for FfiClinicalProfile {
    fn from(c: ClinicalProfile) -> Self {
        Self {
            thalassemia_type: c.thalassemia_type,
            recent_pre_transfusion_hb: c.recent_pre_transfusion_hb,
            symptoms_between_transfusions: c.symptoms_between_transfusions,
            transfusion_frequency_past_6_months: c.transfusion_frequency_past_6_months,
            usual_transfusion_hb_level: c.usual_transfusion_hb_level,
            organ_issues_history: c.organ_issues_history,
            manual_transfusion_frequency: c.manual_transfusion_frequency,
            poor_growth_history: c.poor_growth_history,
            bone_deformities: c.bone_deformities,
            recurrent_infections: c.recurrent_infections,
        }
    }
}

impl From<FfiClinicalProfile> for ClinicalProfile {
    fn from(c: FfiClinicalProfile) -> Self {
        ClinicalProfile {
            thalassemia_type: c.thalassemia_type,
            recent_pre_transfusion_hb: c.recent_pre_transfusion_hb,
            symptoms_between_transfusions: c.symptoms_between_transfusions,
            transfusion_frequency_past_6_months: c.transfusion_frequency_past_6_months,
            usual_transfusion_hb_level: c.usual_transfusion_hb_level,
            organ_issues_history: c.organ_issues_history,
            manual_transfusion_frequency: c.manual_transfusion_frequency,
            poor_growth_history: c.poor_growth_history,
            bone_deformities: c.bone_deformities,
            recurrent_infections: c.recurrent_infections,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub blood_group: String,
    pub location: String,
    pub clinical: FfiClinicalProfile,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            blood_group: patient.blood_group,
            location: patient.location,
            clinical: patient.clinical.into(),
        }
    }
}

impl From<FfiPatient> for Patient {
    fn from(patient: FfiPatient) -> Self {
        Patient {
            id: patient.id,
            name: patient.name,
            blood_group: patient.blood_group,
            location: patient.location,
            clinical: patient.clinical.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// FFI-safe donor. `last_donation` is RFC 3339.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDonor {
    pub id: String,
    pub name: String,
    pub blood_group: String,
    pub location: String,
    pub last_donation: Option<String>,
    pub available_for_donation: bool,
    pub total_donations: u32,
}

impl From<Donor> for FfiDonor {
    fn from(donor: Donor) -> Self {
        Self {
            id: donor.id,
            name: donor.name,
            blood_group: donor.blood_group,
            location: donor.location,
            last_donation: donor.last_donation.map(|ts| ts.to_rfc3339()),
            available_for_donation: donor.available_for_donation,
            total_donations: donor.total_donations,
        }
    }
}

impl TryFrom<FfiDonor> for Donor {
    type Error = DonorMatchError;

    fn try_from(donor: FfiDonor) -> Result<Self, Self::Error> {
        let last_donation = donor
            .last_donation
            .as_deref()
            .map(parse_ffi_timestamp)
            .transpose()?;
        Ok(Donor {
            id: donor.id,
            name: donor.name,
            blood_group: donor.blood_group,
            location: donor.location,
            last_donation,
            available_for_donation: donor.available_for_donation,
            total_donations: donor.total_donations,
        })
    }
}

/// Donors assigned to one patient in a run.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientAssignment {
    pub patient_id: String,
    /// Donor ids in rank order
    pub donor_ids: Vec<String>,
}

/// A pair that could not be persisted.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFailedAssignment {
    pub patient_id: String,
    pub donor_id: String,
    pub error: String,
}

/// FFI-safe assignment run result. `assignments` follows serving order.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssignmentOutcome {
    pub assignments: Vec<FfiPatientAssignment>,
    pub failed: Vec<FfiFailedAssignment>,
    pub patients_processed: u32,
    pub total_assignments: u32,
}

impl From<AssignmentOutcome> for FfiAssignmentOutcome {
    fn from(outcome: AssignmentOutcome) -> Self {
        Self {
            assignments: outcome
                .in_processing_order()
                .map(|(patient_id, donors)| FfiPatientAssignment {
                    patient_id: patient_id.to_string(),
                    donor_ids: donors.iter().map(|r| r.donor.id.clone()).collect(),
                })
                .collect(),
            failed: outcome
                .failed
                .into_iter()
                .map(|f| FfiFailedAssignment {
                    patient_id: f.patient_id,
                    donor_id: f.donor_id,
                    error: f.error,
                })
                .collect(),
            patients_processed: outcome.patients_processed as u32,
            total_assignments: outcome.total_assignments as u32,
        }
    }
}

/// FFI-safe transfusion recommendation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTransfusionRecommendation {
    pub frequency: String,
    pub display_name: String,
    pub reasoning: Vec<String>,
    pub confidence: String,
}

impl From<TransfusionRecommendation> for FfiTransfusionRecommendation {
    fn from(rec: TransfusionRecommendation) -> Self {
        Self {
            display_name: models::frequency_display_name(&rec.frequency),
            frequency: rec.frequency,
            reasoning: rec.reasoning,
            confidence: rec.confidence.as_str().to_string(),
        }
    }
}
