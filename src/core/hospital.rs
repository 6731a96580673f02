use serde::{Deserialize, Serialize};

use crate::core::types::HospitalId;

/// A hospital listed in the reference directory.
///
/// Hospitals are curated reference data: they are read from the directory
/// file and never created through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,

    pub name: String,

    /// Free-text location (city, area)
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Services offered, e.g. "Blood Bank" or "ICU"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Hospital {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: HospitalId::new(id),
            name: name.into(),
            location: location.into(),
            contact: None,
            services: Vec::new(),
            website: None,
        }
    }

    /// Builder method to add a service
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.services.push(service.into());
        self
    }

    /// Whether any listed service contains `needle`, case-insensitively
    #[must_use]
    pub fn offers(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty() || self.services.iter().any(|s| s.to_lowercase().contains(&needle))
    }
}
