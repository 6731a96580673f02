//! Core domain types for donor matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`BloodType`]: The eight canonical ABO/Rh types
//! - [`UrgencyLevel`]: Request priority (`High > Medium > Low`)
//! - [`Donor`]: A registered donor
//! - [`BloodRequest`]: An open request for blood
//! - [`Hospital`]: A hospital in the reference directory
//! - [`NewDonorData`], [`NewRequestData`]: Unvalidated registration payloads
//!
//! ## Validation boundary
//!
//! Blood types and urgency levels are parsed exactly once, when data enters
//! the system. Everything downstream of parsing works with the enums and
//! cannot observe a non-canonical value.
//!
//! | Input      | Parsed as              |
//! |------------|------------------------|
//! | `"ab+"`    | `BloodType::AbPos`     |
//! | `" O- "`   | `BloodType::ONeg`      |
//! | `"C+"`     | `ParseBloodTypeError`  |
//! | `"high"`   | `UrgencyLevel::High`   |

pub mod donor;
pub mod hospital;
pub mod request;
pub mod types;

pub use donor::{Donor, NewDonorData};
pub use hospital::Hospital;
pub use request::{BloodRequest, NewRequestData, RequestSummaryInput};
pub use types::{BloodType, DonorId, HospitalId, RequestId, UrgencyLevel};
