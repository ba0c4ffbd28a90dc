//! Donor models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BloodGroup;

/// A registered blood donor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donor {
    /// Donor UUID
    pub id: String,
    /// Display name
    pub name: String,
    /// Blood group as stored; may be unrecognised
    pub blood_group: String,
    /// Locality key
    pub location: String,
    /// Last completed donation, `None` if the donor has never donated
    pub last_donation: Option<DateTime<Utc>>,
    /// Whether the donor is currently willing to be assigned
    pub available_for_donation: bool,
    /// Lifetime donation count
    pub total_donations: u32,
}

impl Donor {
    /// Create a new available donor who has not donated yet.
    pub fn new(name: String, blood_group: String, location: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            blood_group,
            location,
            last_donation: None,
            available_for_donation: true,
            total_donations: 0,
        }
    }

    /// Parsed blood group, `None` when the stored value is not recognised.
    pub fn blood_group(&self) -> Option<BloodGroup> {
        BloodGroup::parse(&self.blood_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_donor() {
        let donor = Donor::new("Kiran".into(), "O-".into(), "Mumbai".into());
        assert!(donor.available_for_donation);
        assert!(donor.last_donation.is_none());
        assert_eq!(donor.total_donations, 0);
        assert_eq!(donor.blood_group(), Some(BloodGroup::ONeg));
    }

    #[test]
    fn test_serde_roundtrip_keeps_missing_donation() {
        let donor = Donor::new("Kiran".into(), "O-".into(), "Mumbai".into());
        let json = serde_json::to_string(&donor).unwrap();
        assert!(json.contains("\"last_donation\":null"));
    }
}
