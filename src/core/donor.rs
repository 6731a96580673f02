use serde::{Deserialize, Serialize};

use crate::core::types::{BloodType, DonorId};
use crate::utils::validation::{
    validate_contact, validate_text, ValidationError, MAX_LOCATION_LENGTH, MAX_NAME_LENGTH,
};

/// A registered blood donor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donor {
    /// Unique identifier assigned by the directory
    pub id: DonorId,

    /// Display name
    pub name: String,

    /// Canonical ABO/Rh type
    pub blood_type: BloodType,

    /// Free-text location (city, area)
    pub location: String,

    /// Phone-like contact string
    pub contact: String,
}

impl Donor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        blood_type: BloodType,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: DonorId::new(id),
            name: name.into(),
            blood_type,
            location: location.into(),
            contact: String::new(),
        }
    }

    /// Builder method to set the contact
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }
}

/// Donor registration payload, as submitted by a registration form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonorData {
    pub name: String,
    pub blood_type: String,
    pub location: String,
    pub contact: String,
}

/// A registration payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDonorData {
    pub name: String,
    pub blood_type: BloodType,
    pub location: String,
    pub contact: String,
}

impl NewDonorData {
    /// Validate the payload at the registration boundary.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    pub fn validate(&self) -> Result<ValidDonorData, ValidationError> {
        Ok(ValidDonorData {
            name: validate_text("name", &self.name, MAX_NAME_LENGTH)?,
            blood_type: self.blood_type.parse()?,
            location: validate_text("location", &self.location, MAX_LOCATION_LENGTH)?,
            contact: validate_contact(&self.contact)?,
        })
    }
}

impl ValidDonorData {
    /// Attach a directory-assigned id
    #[must_use]
    pub fn into_donor(self, id: DonorId) -> Donor {
        Donor {
            id,
            name: self.name,
            blood_type: self.blood_type,
            location: self.location,
            contact: self.contact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewDonorData {
        NewDonorData {
            name: " Karim Ahmed ".to_string(),
            blood_type: "a+".to_string(),
            location: "Dhaka".to_string(),
            contact: "01712345678".to_string(),
        }
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let valid = payload().validate().unwrap();
        assert_eq!(valid.name, "Karim Ahmed");
        assert_eq!(valid.blood_type, BloodType::APos);

        let donor = valid.into_donor(DonorId::new("DNR009"));
        assert_eq!(donor.id.0, "DNR009");
        assert_eq!(donor.location, "Dhaka");
    }

    #[test]
    fn test_validate_rejects_bad_blood_type() {
        let mut data = payload();
        data.blood_type = "C+".to_string();
        assert!(matches!(data.validate(), Err(ValidationError::BloodType(_))));
    }

    #[test]
    fn test_validate_rejects_bad_contact() {
        let mut data = payload();
        data.contact = "not a phone".to_string();
        assert!(matches!(
            data.validate(),
            Err(ValidationError::InvalidContact(_))
        ));
    }

    #[test]
    fn test_payload_uses_camel_case() {
        let data: NewDonorData = serde_json::from_str(
            r#"{"name":"Rahim","bloodType":"B+","location":"Sylhet","contact":"01912345680"}"#,
        )
        .unwrap();
        assert_eq!(data.blood_type, "B+");
    }
}
