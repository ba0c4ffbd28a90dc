//! Assignment run configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Donors assigned to each patient per run unless overridden.
pub const DEFAULT_MAX_DONORS_PER_PATIENT: usize = 20;

/// Donors who gave blood within this many days are ranked as "recent".
pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 180;

/// Attempts per (patient, donor) upsert before the pair is reported failed.
pub const DEFAULT_PERSIST_ATTEMPTS: u32 = 2;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "donor_match_core=info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for an allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    pub max_donors_per_patient: usize,
    /// Inclusive upper bound of the "recent" partition
    pub recency_window_days: i64,
    pub persist_attempts: u32,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            max_donors_per_patient: DEFAULT_MAX_DONORS_PER_PATIENT,
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            persist_attempts: DEFAULT_PERSIST_ATTEMPTS,
        }
    }
}

impl AssignmentConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Same config with a different per-patient capacity.
    pub fn with_max_donors(mut self, max_donors_per_patient: usize) -> Self {
        self.max_donors_per_patient = max_donors_per_patient;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persist_attempts == 0 {
            return Err(ConfigError::Invalid(
                "persist_attempts must be at least 1".into(),
            ));
        }
        if self.recency_window_days < 0 {
            return Err(ConfigError::Invalid(format!(
                "recency_window_days must not be negative, got {}",
                self.recency_window_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AssignmentConfig::default();
        assert_eq!(config.max_donors_per_patient, 20);
        assert_eq!(config.recency_window_days, 180);
        assert_eq!(config.persist_attempts, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AssignmentConfig::from_json(r#"{"max_donors_per_patient": 5}"#).unwrap();
        assert_eq!(config.max_donors_per_patient, 5);
        assert_eq!(config.recency_window_days, 180);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let result = AssignmentConfig::from_json(r#"{"persist_attempts": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_negative_window() {
        let result = AssignmentConfig::from_json(r#"{"recency_window_days": -1}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            AssignmentConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
