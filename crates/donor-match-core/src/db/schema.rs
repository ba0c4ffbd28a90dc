//! SQLite schema definition.

/// Complete database schema for donor matching.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    blood_group TEXT NOT NULL,                   -- raw value, may be unrecognised
    location TEXT NOT NULL,

    -- Clinical status (transfusion-frequency inputs)
    thalassemia_type TEXT,
    recent_pre_transfusion_hb TEXT,
    symptoms_between_transfusions TEXT,
    transfusion_frequency_past_6_months TEXT,
    usual_transfusion_hb_level TEXT,
    organ_issues_history TEXT,
    manual_transfusion_frequency TEXT,
    poor_growth_history INTEGER NOT NULL DEFAULT 0,
    bone_deformities INTEGER NOT NULL DEFAULT 0,
    recurrent_infections INTEGER NOT NULL DEFAULT 0,

    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_location ON patients(location);

-- ============================================================================
-- Donors
-- ============================================================================

CREATE TABLE IF NOT EXISTS donors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    blood_group TEXT NOT NULL,
    location TEXT NOT NULL,
    last_donation TEXT,                          -- RFC 3339 or YYYY-MM-DD, NULL if never
    available_for_donation INTEGER NOT NULL DEFAULT 1,
    total_donations INTEGER NOT NULL DEFAULT 0 CHECK (total_donations >= 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_donors_available ON donors(available_for_donation);
CREATE INDEX IF NOT EXISTS idx_donors_location ON donors(location);

-- ============================================================================
-- Donor Families (patient <-> donor assignments, soft-deleted via is_active)
-- ============================================================================

CREATE TABLE IF NOT EXISTS donor_families (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    donor_id TEXT NOT NULL REFERENCES donors(id) ON DELETE CASCADE,
    assigned_at TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    UNIQUE (patient_id, donor_id)
);

CREATE INDEX IF NOT EXISTS idx_families_patient ON donor_families(patient_id, is_active);
CREATE INDEX IF NOT EXISTS idx_families_donor ON donor_families(donor_id, is_active);
"#;
