//! ABO/Rh blood groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "AB+")]
    AbPos,
}

impl BloodGroup {
    /// All groups, universal donor first.
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::ONeg,
        BloodGroup::OPos,
        BloodGroup::ANeg,
        BloodGroup::APos,
        BloodGroup::BNeg,
        BloodGroup::BPos,
        BloodGroup::AbNeg,
        BloodGroup::AbPos,
    ];

    /// Canonical string form ("O-", "AB+", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::ONeg => "O-",
            BloodGroup::OPos => "O+",
            BloodGroup::ANeg => "A-",
            BloodGroup::APos => "A+",
            BloodGroup::BNeg => "B-",
            BloodGroup::BPos => "B+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::AbPos => "AB+",
        }
    }

    /// Parse a stored blood group. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|group| group.as_str() == value.trim())
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the eight blood groups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blood group: {0}")]
pub struct UnknownBloodGroup(pub String);

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownBloodGroup(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_groups() {
        for group in BloodGroup::ALL {
            assert_eq!(BloodGroup::parse(group.as_str()), Some(group));
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(BloodGroup::parse(" AB+ "), Some(BloodGroup::AbPos));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(BloodGroup::parse("C+"), None);
        assert_eq!(BloodGroup::parse("ab+"), None);
        assert_eq!(BloodGroup::parse(""), None);
        assert!("Z".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let json = serde_json::to_string(&BloodGroup::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
        let back: BloodGroup = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(back, BloodGroup::OPos);
    }
}
