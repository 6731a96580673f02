//! Donor matching engine and scoring rules.
//!
//! This module provides the core matching functionality:
//!
//! - [`MatchingEngine`]: Main entry point for ranking a donor pool
//! - [`is_compatible`]: ABO/Rh transfusion compatibility
//! - [`score_location`]: Textual location affinity
//! - [`urgency_weight`]: Priority weight of an urgency level
//! - [`MatchDiagnosis`]: Structured explanation attached to each candidate
//!
//! ## Ranking Algorithm
//!
//! 1. **Filter**: Drop donors whose type cannot give to the requested type
//! 2. **Location**: Score each survivor as Exact, Partial, or None
//! 3. **Order**: Location tier first, then compatibility specificity
//!    (exact type, compatible type, universal donor), then input order
//! 4. **Cap**: Optionally truncate to a configured result cap
//!
//! Ranking is a pure function of its inputs. Calling it twice with the same
//! request and pool yields the same ordered output.
//!
//! ## Example
//!
//! ```rust
//! use donor_match::core::{BloodType, Donor, UrgencyLevel};
//! use donor_match::matching::{MatchRequest, MatchingEngine};
//!
//! let donors = vec![
//!     Donor::new("DNR001", "Karim", BloodType::ONeg, "Dhaka"),
//!     Donor::new("DNR002", "Fatima", BloodType::APos, "Dhaka"),
//! ];
//! let request = MatchRequest::new(BloodType::ONeg, "Dhaka", UrgencyLevel::High);
//!
//! let report = MatchingEngine::new(&donors).find_matches(&request);
//! assert_eq!(report.candidates.len(), 1);
//!
//! for m in &report.candidates {
//!     println!("#{} {}: {}", m.rank, m.donor.name, m.match_reason());
//! }
//! ```

pub mod compatibility;
pub mod diagnosis;
pub mod engine;
pub mod scoring;

pub use compatibility::{is_compatible, CompatibilityKind};
pub use diagnosis::MatchDiagnosis;
pub use engine::{rank_matches, MatchCandidate, MatchReport, MatchRequest, MatchingConfig, MatchingEngine};
pub use scoring::{score_location, urgency_weight, AffinityTier, LocationAffinity};
