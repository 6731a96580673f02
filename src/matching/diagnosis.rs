use serde::{Deserialize, Serialize};

use crate::matching::compatibility::CompatibilityKind;
use crate::matching::scoring::AffinityTier;

/// Structured explanation of why a donor was ranked where it was
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDiagnosis {
    /// How the donor's type relates to the requested type
    pub blood_relation: CompatibilityKind,

    /// How the donor's location relates to the request's
    pub location_relation: AffinityTier,

    /// Human-readable sentence, e.g. "exact type match, same location"
    pub reason: String,
}

impl MatchDiagnosis {
    #[must_use]
    pub fn analyze(blood_relation: CompatibilityKind, location_relation: AffinityTier) -> Self {
        let reason = format!(
            "{}, {}",
            capitalize(blood_relation.describe()),
            location_relation.describe()
        );

        Self {
            blood_relation,
            location_relation,
            reason,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
