//! Transfusion planning models.

use serde::{Deserialize, Serialize};

/// Standard transfusion intervals the estimator can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransfusionInterval {
    #[serde(rename = "every-2-weeks")]
    Every2Weeks,
    #[serde(rename = "every-3-weeks")]
    Every3Weeks,
    #[serde(rename = "every-4-weeks")]
    Every4Weeks,
    #[serde(rename = "every-6-weeks")]
    Every6Weeks,
    #[serde(rename = "every-8-weeks")]
    Every8Weeks,
    #[serde(rename = "as-needed")]
    AsNeeded,
}

impl TransfusionInterval {
    const ALL: [TransfusionInterval; 6] = [
        TransfusionInterval::Every2Weeks,
        TransfusionInterval::Every3Weeks,
        TransfusionInterval::Every4Weeks,
        TransfusionInterval::Every6Weeks,
        TransfusionInterval::Every8Weeks,
        TransfusionInterval::AsNeeded,
    ];

    /// Stored key, e.g. "every-3-weeks".
    pub fn as_str(&self) -> &'static str {
        match self {
            TransfusionInterval::Every2Weeks => "every-2-weeks",
            TransfusionInterval::Every3Weeks => "every-3-weeks",
            TransfusionInterval::Every4Weeks => "every-4-weeks",
            TransfusionInterval::Every6Weeks => "every-6-weeks",
            TransfusionInterval::Every8Weeks => "every-8-weeks",
            TransfusionInterval::AsNeeded => "as-needed",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            TransfusionInterval::Every2Weeks => "Every 2 weeks",
            TransfusionInterval::Every3Weeks => "Every 3 weeks",
            TransfusionInterval::Every4Weeks => "Every 4 weeks",
            TransfusionInterval::Every6Weeks => "Every 6 weeks",
            TransfusionInterval::Every8Weeks => "Every 8 weeks",
            TransfusionInterval::AsNeeded => "As needed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.as_str() == value)
    }
}

/// Label for a stored frequency key, falling back to the raw value.
pub fn frequency_display_name(frequency: &str) -> String {
    TransfusionInterval::parse(frequency)
        .map(|i| i.display_name().to_string())
        .unwrap_or_else(|| frequency.to_string())
}

/// How much the estimator trusts its own recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Recommended interval with the rules that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransfusionRecommendation {
    /// Interval key; a manual override is passed through verbatim
    pub frequency: String,
    pub reasoning: Vec<String>,
    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(frequency_display_name("every-2-weeks"), "Every 2 weeks");
        assert_eq!(frequency_display_name("as-needed"), "As needed");
        assert_eq!(frequency_display_name("every-5-weeks"), "every-5-weeks");
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
