use serde::{Deserialize, Serialize};

use crate::core::types::UrgencyLevel;

/// Coarse closeness bucket for two free-text locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffinityTier {
    None,
    Partial,
    Exact,
}

impl AffinityTier {
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Partial => 0.5,
            Self::None => 0.0,
        }
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Exact => "same location",
            Self::Partial => "nearby",
            Self::None => "different location",
        }
    }
}

/// Location affinity between a request and a donor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationAffinity {
    pub tier: AffinityTier,
    pub score: f64,
}

impl From<AffinityTier> for LocationAffinity {
    fn from(tier: AffinityTier) -> Self {
        Self {
            tier,
            score: tier.score(),
        }
    }
}

/// Score how close two free-text locations are.
///
/// Comparison is case-insensitive on trimmed text. Equal strings are
/// `Exact`, one containing the other (e.g. "Dhaka" within "Mirpur, Dhaka")
/// is `Partial`, anything else is `None`.
///
/// Two empty locations count as `Exact`. A single empty location is `None`,
/// since the empty string would otherwise be a substring of everything.
#[must_use]
pub fn score_location(request_location: &str, donor_location: &str) -> LocationAffinity {
    let request = request_location.trim().to_lowercase();
    let donor = donor_location.trim().to_lowercase();

    let tier = if request == donor {
        AffinityTier::Exact
    } else if request.is_empty() || donor.is_empty() {
        AffinityTier::None
    } else if request.contains(&donor) || donor.contains(&request) {
        AffinityTier::Partial
    } else {
        AffinityTier::None
    };

    tier.into()
}

/// Priority weight for an urgency level: High=3, Medium=2, Low=1
#[must_use]
pub fn urgency_weight(level: UrgencyLevel) -> u32 {
    match level {
        UrgencyLevel::High => 3,
        UrgencyLevel::Medium => 2,
        UrgencyLevel::Low => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_location_tiers() {
        assert_eq!(score_location("Dhaka", "Dhaka").tier, AffinityTier::Exact);
        assert_eq!(
            score_location("Dhaka", "Mirpur, Dhaka").tier,
            AffinityTier::Partial
        );
        assert_eq!(score_location("Dhaka", "Sylhet").tier, AffinityTier::None);
    }

    #[test]
    fn test_score_location_is_symmetric_for_substrings() {
        assert_eq!(
            score_location("Dhanmondi, Dhaka", "Dhaka").tier,
            AffinityTier::Partial
        );
    }

    #[test]
    fn test_score_location_normalizes_case_and_whitespace() {
        let affinity = score_location("  DHAKA ", "dhaka");
        assert_eq!(affinity.tier, AffinityTier::Exact);
        assert!((affinity.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_location_empty_edge_cases() {
        assert_eq!(score_location("", "").tier, AffinityTier::Exact);
        assert_eq!(score_location("   ", "").tier, AffinityTier::Exact);
        assert_eq!(score_location("", "Dhaka").tier, AffinityTier::None);
        assert_eq!(score_location("Dhaka", " ").tier, AffinityTier::None);
    }

    #[test]
    fn test_scores_per_tier() {
        assert!((score_location("Dhaka", "Mirpur, Dhaka").score - 0.5).abs() < f64::EPSILON);
        assert!(score_location("Dhaka", "Sylhet").score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_urgency_weight_is_monotonic() {
        assert_eq!(urgency_weight(UrgencyLevel::High), 3);
        assert_eq!(urgency_weight(UrgencyLevel::Medium), 2);
        assert_eq!(urgency_weight(UrgencyLevel::Low), 1);
        assert!(urgency_weight(UrgencyLevel::High) > urgency_weight(UrgencyLevel::Medium));
    }
}
