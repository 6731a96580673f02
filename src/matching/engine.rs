use serde::{Deserialize, Serialize};

use crate::core::donor::Donor;
use crate::core::request::BloodRequest;
use crate::core::types::{BloodType, UrgencyLevel};
use crate::matching::compatibility::CompatibilityKind;
use crate::matching::diagnosis::MatchDiagnosis;
use crate::matching::scoring::{score_location, urgency_weight, LocationAffinity};

/// What the requester needs: the inputs to ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub blood_type: BloodType,
    pub location: String,
    pub urgency: UrgencyLevel,
}

impl MatchRequest {
    pub fn new(blood_type: BloodType, location: impl Into<String>, urgency: UrgencyLevel) -> Self {
        Self {
            blood_type,
            location: location.into(),
            urgency,
        }
    }
}

impl From<&BloodRequest> for MatchRequest {
    fn from(request: &BloodRequest) -> Self {
        Self::new(request.blood_type, request.location.clone(), request.urgency)
    }
}

/// A compatible donor with its position and explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    /// The matched donor
    pub donor: Donor,

    /// 1-based position in the ranking
    pub rank: usize,

    /// Location closeness to the request
    pub location_affinity: LocationAffinity,

    /// Structured and rendered explanation
    pub diagnosis: MatchDiagnosis,
}

impl MatchCandidate {
    #[must_use]
    pub fn compatibility(&self) -> CompatibilityKind {
        self.diagnosis.blood_relation
    }

    #[must_use]
    pub fn match_reason(&self) -> &str {
        &self.diagnosis.reason
    }
}

/// Result of ranking a donor pool against one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// Ranked candidates, possibly capped
    pub candidates: Vec<MatchCandidate>,

    /// Compatible donors before the result cap was applied
    pub compatible_count: usize,

    /// Weight of the request's urgency, for callers that cap by priority
    pub urgency_weight: u32,

    /// Whether the result cap dropped any candidates
    pub truncated: bool,
}

impl MatchReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Configuration for the matching engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Maximum number of candidates to return; `None` returns every compatible donor
    #[serde(default)]
    pub result_cap: Option<usize>,
}

impl MatchingConfig {
    #[must_use]
    pub fn with_result_cap(cap: usize) -> Self {
        Self {
            result_cap: Some(cap),
        }
    }
}

/// The main matching engine, ranking a snapshot of the donor pool
pub struct MatchingEngine<'a> {
    donors: &'a [Donor],
    config: MatchingConfig,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    pub fn new(donors: &'a [Donor]) -> Self {
        Self {
            donors,
            config: MatchingConfig::default(),
        }
    }

    /// Create a new matching engine with custom configuration
    pub fn with_config(donors: &'a [Donor], config: MatchingConfig) -> Self {
        Self { donors, config }
    }

    /// Rank the compatible donors for a request
    #[must_use]
    pub fn find_matches(&self, request: &MatchRequest) -> MatchReport {
        // Step 1: Keep compatible donors, classifying each
        let mut scored: Vec<(&Donor, CompatibilityKind, LocationAffinity)> = self
            .donors
            .iter()
            .filter_map(|donor| {
                CompatibilityKind::classify(request.blood_type, donor.blood_type).map(|kind| {
                    // Step 2: Location affinity
                    let affinity = score_location(&request.location, &donor.location);
                    (donor, kind, affinity)
                })
            })
            .collect();

        // Step 3: Location tier, then specificity. sort_by is stable, so
        // equal keys keep input order.
        scored.sort_by(|a, b| b.2.tier.cmp(&a.2.tier).then_with(|| b.1.cmp(&a.1)));

        let compatible_count = scored.len();
        let limit = self.config.result_cap.unwrap_or(usize::MAX);

        let candidates: Vec<MatchCandidate> = scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (donor, kind, affinity))| MatchCandidate {
                donor: donor.clone(),
                rank: i + 1,
                location_affinity: affinity,
                diagnosis: MatchDiagnosis::analyze(kind, affinity.tier),
            })
            .collect();

        tracing::debug!(
            requested = %request.blood_type,
            pool = self.donors.len(),
            compatible = compatible_count,
            returned = candidates.len(),
            "Ranked donor pool"
        );

        MatchReport {
            truncated: candidates.len() < compatible_count,
            candidates,
            compatible_count,
            urgency_weight: urgency_weight(request.urgency),
        }
    }

    /// Find the single best candidate
    #[cfg(test)]
    pub fn find_best_match(&self, request: &MatchRequest) -> Option<MatchCandidate> {
        self.find_matches(request).candidates.into_iter().next()
    }
}

/// Rank every compatible donor in `donors` for `request`, uncapped
#[must_use]
pub fn rank_matches(request: &MatchRequest, donors: &[Donor]) -> Vec<MatchCandidate> {
    MatchingEngine::new(donors).find_matches(request).candidates
}
