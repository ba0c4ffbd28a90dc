//! Patient models.

use serde::{Deserialize, Serialize};

use super::BloodGroup;

/// A thalassemia patient awaiting a donor family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Patient UUID
    pub id: String,
    /// Display name
    pub name: String,
    /// Blood group as stored (e.g., "B+"); may be unrecognised
    pub blood_group: String,
    /// Locality key, matched exactly against donor locations
    pub location: String,
    /// Clinical fields used by the transfusion-frequency estimator
    pub clinical: ClinicalProfile,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(name: String, blood_group: String, location: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            blood_group,
            location,
            clinical: ClinicalProfile::default(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Parsed blood group, `None` when the stored value is not recognised.
    pub fn blood_group(&self) -> Option<BloodGroup> {
        BloodGroup::parse(&self.blood_group)
    }
}

/// Clinical history relevant to transfusion planning.
///
/// Free-text fields mirror what patients enter in their health profile,
/// so numeric values such as hemoglobin stay as strings until scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicalProfile {
    /// e.g. "beta-thalassemia-major", "thalassemia-intermedia"
    pub thalassemia_type: Option<String>,
    /// Most recent pre-transfusion hemoglobin in g/dL
    pub recent_pre_transfusion_hb: Option<String>,
    pub symptoms_between_transfusions: Option<String>,
    /// Observed interval over the last six months, e.g. "every-3-weeks"
    pub transfusion_frequency_past_6_months: Option<String>,
    pub usual_transfusion_hb_level: Option<String>,
    pub organ_issues_history: Option<String>,
    /// Interval set by the patient or clinician; bypasses scoring
    pub manual_transfusion_frequency: Option<String>,
    pub poor_growth_history: bool,
    pub bone_deformities: bool,
    pub recurrent_infections: bool,
}

impl ClinicalProfile {
    /// Whether any complication flag is set.
    pub fn has_complications(&self) -> bool {
        self.poor_growth_history || self.bone_deformities || self.recurrent_infections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient() {
        let patient = Patient::new("Asha".into(), "B+".into(), "Bangalore".into());
        assert_eq!(patient.name, "Asha");
        assert_eq!(patient.blood_group(), Some(BloodGroup::BPos));
        assert_eq!(patient.id.len(), 36); // UUID format
        assert_eq!(patient.clinical, ClinicalProfile::default());
    }

    #[test]
    fn test_unknown_blood_group() {
        let patient = Patient::new("Ravi".into(), "unknown".into(), "Pune".into());
        assert_eq!(patient.blood_group(), None);
    }

    #[test]
    fn test_has_complications() {
        let mut profile = ClinicalProfile::default();
        assert!(!profile.has_complications());
        profile.bone_deformities = true;
        assert!(profile.has_complications());
    }
}
