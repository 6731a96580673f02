//! # donor-match
//!
//! A library for matching blood donors to blood requests.
//!
//! A regional blood directory holds registered donors and open requests.
//! When a request comes in, coordinators need to know which donors can give
//! to it, who to call first, and why.
//!
//! `donor-match` answers that with a deterministic ranking: it filters the
//! donor pool by ABO/Rh compatibility, orders survivors by location
//! closeness and blood-type specificity, and explains every position.
//!
//! ## Features
//!
//! - **Compatibility rules**: The full ABO/Rh donor table, O- universal donor
//!   and AB+ universal recipient
//! - **Location affinity**: Case-insensitive textual closeness (same, nearby, different)
//! - **Stable ranking**: Identical inputs always produce identical output
//! - **Match reasons**: A short sentence for every candidate
//! - **Request digests**: Local deterministic summaries, or a generative text service
//! - **Directory**: JSON-backed donor and request storage with validated submissions,
//!   plus a hospital reference listing
//!
//! ## Example
//!
//! ```rust
//! use donor_match::{BloodType, DonorDirectory, JsonDirectory, MatchRequest, MatchingEngine, UrgencyLevel};
//!
//! // Load the embedded seed directory
//! let directory = JsonDirectory::load_embedded().unwrap();
//! let donors = directory.list_donors().unwrap();
//!
//! // Rank donors for an urgent O- request in Dhaka
//! let request = MatchRequest::new(BloodType::ONeg, "Dhaka", UrgencyLevel::High);
//! let report = MatchingEngine::new(&donors).find_matches(&request);
//!
//! for m in &report.candidates {
//!     println!("#{} {}: {}", m.rank, m.donor.name, m.match_reason());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Domain types for donors, requests, blood types, and urgency
//! - [`matching`]: Compatibility rules, scoring, and the ranking engine
//! - [`digest`]: Request digests
//! - [`directory`]: Donor and request directories
//! - [`identity`]: User identity for gated submissions
//! - [`narrative`]: Generative text service client
//! - [`config`]: TOML and environment configuration
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API server

pub mod cli;
pub mod config;
pub mod core;
pub mod digest;
pub mod directory;
pub mod identity;
pub mod matching;
pub mod narrative;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::core::donor::Donor;
pub use crate::core::request::BloodRequest;
pub use crate::core::types::*;
pub use directory::{DonorDirectory, HospitalDirectory, JsonDirectory, RequestDirectory};
pub use matching::engine::{rank_matches, MatchCandidate, MatchRequest, MatchingEngine};
