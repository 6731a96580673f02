use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{BloodType, RequestId, UrgencyLevel};
use crate::utils::validation::{
    validate_contact, validate_optional_text, validate_text, ValidationError,
    MAX_HOSPITAL_LENGTH, MAX_LOCATION_LENGTH, MAX_NAME_LENGTH, MAX_NOTES_LENGTH,
};

/// An open request for blood
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: RequestId,

    pub patient_name: String,

    /// Blood type the patient needs
    pub blood_type: BloodType,

    pub location: String,

    pub urgency: UrgencyLevel,

    pub contact: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Submission time
    pub posted_at: DateTime<Utc>,
}

impl BloodRequest {
    /// Project this request onto the fields a digest needs
    #[must_use]
    pub fn summary_input(&self) -> RequestSummaryInput {
        RequestSummaryInput {
            blood_type: self.blood_type,
            location: self.location.clone(),
            urgency: self.urgency,
            contact: self.contact.clone(),
        }
    }
}

/// The slice of a request used when building digests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummaryInput {
    pub blood_type: BloodType,
    pub location: String,
    pub urgency: UrgencyLevel,
    pub contact: String,
}

impl RequestSummaryInput {
    pub fn new(
        blood_type: BloodType,
        location: impl Into<String>,
        urgency: UrgencyLevel,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            blood_type,
            location: location.into(),
            urgency,
            contact: contact.into(),
        }
    }
}

/// Request submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestData {
    pub patient_name: String,
    pub blood_type: String,
    pub location: String,
    pub urgency: String,
    pub contact: String,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A submission payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequestData {
    pub patient_name: String,
    pub blood_type: BloodType,
    pub location: String,
    pub urgency: UrgencyLevel,
    pub contact: String,
    pub hospital_name: Option<String>,
    pub notes: Option<String>,
}

impl NewRequestData {
    /// Validate the payload at the submission boundary.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    pub fn validate(&self) -> Result<ValidRequestData, ValidationError> {
        Ok(ValidRequestData {
            patient_name: validate_text("patient name", &self.patient_name, MAX_NAME_LENGTH)?,
            blood_type: self.blood_type.parse()?,
            location: validate_text("location", &self.location, MAX_LOCATION_LENGTH)?,
            urgency: self.urgency.parse()?,
            contact: validate_contact(&self.contact)?,
            hospital_name: validate_optional_text(
                "hospital name",
                self.hospital_name.as_deref(),
                MAX_HOSPITAL_LENGTH,
            )?,
            notes: validate_optional_text("notes", self.notes.as_deref(), MAX_NOTES_LENGTH)?,
        })
    }
}

impl ValidRequestData {
    #[must_use]
    pub fn into_request(self, id: RequestId, posted_at: DateTime<Utc>) -> BloodRequest {
        BloodRequest {
            id,
            patient_name: self.patient_name,
            blood_type: self.blood_type,
            location: self.location,
            urgency: self.urgency,
            contact: self.contact,
            hospital_name: self.hospital_name,
            notes: self.notes,
            posted_at,
        }
    }
}
