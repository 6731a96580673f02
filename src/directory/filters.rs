use std::cmp::Reverse;
use std::str::FromStr;

use serde::Deserialize;

use crate::core::donor::Donor;
use crate::core::hospital::Hospital;
use crate::core::request::BloodRequest;
use crate::core::types::{BloodType, UrgencyLevel};

/// Case-insensitive substring test on trimmed text. An empty needle matches.
fn location_contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystack.trim().to_lowercase().contains(&needle)
}

/// Donor listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorFilter {
    /// Exact blood type
    pub blood_type: Option<BloodType>,
    /// Location substring, case-insensitive
    pub location: Option<String>,
}

impl DonorFilter {
    #[must_use]
    pub fn matches(&self, donor: &Donor) -> bool {
        self.blood_type.map_or(true, |bt| donor.blood_type == bt)
            && self
                .location
                .as_deref()
                .map_or(true, |loc| location_contains(&donor.location, loc))
    }

    #[must_use]
    pub fn apply(&self, donors: Vec<Donor>) -> Vec<Donor> {
        donors.into_iter().filter(|d| self.matches(d)).collect()
    }
}

/// Request listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSort {
    /// Most urgent first, then most recently posted
    #[default]
    Urgency,
    /// Most recently posted first
    Recency,
}

impl FromStr for RequestSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgency" => Ok(Self::Urgency),
            "recency" | "recent" => Ok(Self::Recency),
            other => Err(format!("unknown sort order '{other}' (expected urgency or recency)")),
        }
    }
}

/// Request listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub blood_type: Option<BloodType>,
    pub location: Option<String>,
    pub urgency: Option<UrgencyLevel>,
}

impl RequestFilter {
    #[must_use]
    pub fn matches(&self, request: &BloodRequest) -> bool {
        self.blood_type.map_or(true, |bt| request.blood_type == bt)
            && self.urgency.map_or(true, |u| request.urgency == u)
            && self
                .location
                .as_deref()
                .map_or(true, |loc| location_contains(&request.location, loc))
    }

    /// Filter, then order by `sort`
    #[must_use]
    pub fn apply(&self, requests: Vec<BloodRequest>, sort: RequestSort) -> Vec<BloodRequest> {
        let mut kept: Vec<BloodRequest> = requests.into_iter().filter(|r| self.matches(r)).collect();
        sort_requests(&mut kept, sort);
        kept
    }
}

/// Hospital listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalFilter {
    /// Location substring, case-insensitive
    pub location: Option<String>,
    /// Service substring, case-insensitive
    pub service: Option<String>,
}

impl HospitalFilter {
    #[must_use]
    pub fn matches(&self, hospital: &Hospital) -> bool {
        self.location
            .as_deref()
            .map_or(true, |loc| location_contains(&hospital.location, loc))
            && self.service.as_deref().map_or(true, |s| hospital.offers(s))
    }

    #[must_use]
    pub fn apply(&self, hospitals: Vec<Hospital>) -> Vec<Hospital> {
        hospitals.into_iter().filter(|h| self.matches(h)).collect()
    }
}

/// Stable in-place sort of requests
pub fn sort_requests(requests: &mut [BloodRequest], sort: RequestSort) {
    match sort {
        RequestSort::Urgency => {
            requests.sort_by_key(|r| (Reverse(r.urgency), Reverse(r.posted_at)));
        }
        RequestSort::Recency => requests.sort_by_key(|r| Reverse(r.posted_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RequestId;
    use chrono::{TimeZone, Utc};

    fn request(id: &str, bt: BloodType, loc: &str, urgency: UrgencyLevel, hour: u32) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(id),
            patient_name: "Patient".to_string(),
            blood_type: bt,
            location: loc.to_string(),
            urgency,
            contact: "01700000000".to_string(),
            hospital_name: None,
            notes: None,
            posted_at: Utc.with_ymd_and_hms(2025, 5, 20, hour, 0, 0).unwrap(),
        }
    }

    fn ids(requests: &[BloodRequest]) -> Vec<&str> {
        requests.iter().map(|r| r.id.0.as_str()).collect()
    }

    #[test]
    fn test_donor_filter() {
        let donors = vec![
            Donor::new("DNR001", "Karim", BloodType::APos, "Dhaka"),
            Donor::new("DNR002", "Fatima", BloodType::ONeg, "Chittagong"),
            Donor::new("DNR003", "Ayesha", BloodType::APos, "North Dhaka"),
        ];

        let filter = DonorFilter {
            blood_type: Some(BloodType::APos),
            location: Some(" DHAKA".to_string()),
        };
        let kept = filter.apply(donors.clone());
        assert_eq!(kept.len(), 2);

        assert_eq!(DonorFilter::default().apply(donors).len(), 3);
    }

    #[test]
    fn test_hospital_filter() {
        let hospitals = vec![
            Hospital::new("HOS001", "Dhaka Medical College Hospital", "Dhaka").with_service("Blood Bank"),
            Hospital::new("HOS003", "Square Hospitals Ltd.", "Dhaka").with_service("24/7 Pharmacy"),
            Hospital::new("HOS005", "Chittagong Medical College Hospital", "Chittagong")
                .with_service("Blood Bank"),
        ];

        let in_dhaka = HospitalFilter {
            location: Some("dhaka".to_string()),
            service: None,
        };
        assert_eq!(in_dhaka.apply(hospitals.clone()).len(), 2);

        let blood_banks_in_dhaka = HospitalFilter {
            location: Some("Dhaka".to_string()),
            service: Some("blood bank".to_string()),
        };
        let kept = blood_banks_in_dhaka.apply(hospitals);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.0, "HOS001");
    }

    #[test]
    fn test_request_sort_by_urgency_then_recency() {
        let requests = vec![
            request("REQ001", BloodType::ONeg, "Dhaka", UrgencyLevel::Low, 9),
            request("REQ002", BloodType::APos, "Dhaka", UrgencyLevel::High, 3),
            request("REQ003", BloodType::BNeg, "Sylhet", UrgencyLevel::High, 7),
            request("REQ004", BloodType::AbPos, "Dhaka", UrgencyLevel::Medium, 1),
        ];

        let sorted = RequestFilter::default().apply(requests.clone(), RequestSort::Urgency);
        assert_eq!(ids(&sorted), vec!["REQ003", "REQ002", "REQ004", "REQ001"]);

        let sorted = RequestFilter::default().apply(requests, RequestSort::Recency);
        assert_eq!(ids(&sorted), vec!["REQ001", "REQ003", "REQ002", "REQ004"]);
    }

    #[test]
    fn test_request_filter_combines_fields() {
        let requests = vec![
            request("REQ001", BloodType::ONeg, "Dhaka", UrgencyLevel::High, 1),
            request("REQ002", BloodType::ONeg, "Dhaka", UrgencyLevel::Low, 2),
            request("REQ003", BloodType::ONeg, "Sylhet", UrgencyLevel::High, 3),
        ];
        let filter = RequestFilter {
            blood_type: Some(BloodType::ONeg),
            location: Some("dhaka".to_string()),
            urgency: Some(UrgencyLevel::High),
        };
        assert_eq!(ids(&filter.apply(requests, RequestSort::Urgency)), vec!["REQ001"]);
    }

    #[test]
    fn test_request_sort_parse() {
        assert_eq!("Urgency".parse::<RequestSort>(), Ok(RequestSort::Urgency));
        assert_eq!("recent".parse::<RequestSort>(), Ok(RequestSort::Recency));
        assert!("alphabetical".parse::<RequestSort>().is_err());
    }
}
