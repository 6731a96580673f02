//! Donor and request directories.
//!
//! The matcher never talks to storage directly. It consumes snapshots from
//! the [`DonorDirectory`] and [`RequestDirectory`] collaborators, which this
//! module defines along with a JSON-file implementation ([`JsonDirectory`]).
//! A read-only [`HospitalDirectory`] lists the curated hospital reference
//! data.
//!
//! Listing is fail-open: [`donors_or_empty`] and [`requests_or_empty`] log a
//! failed fetch and return an empty snapshot. Writes are fail-closed: a
//! failed create is always returned to the caller.

pub mod filters;
pub mod store;

pub use filters::{DonorFilter, HospitalFilter, RequestFilter, RequestSort};
pub use store::{JsonDirectory, RecordLimits};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::donor::{Donor, NewDonorData};
use crate::core::hospital::Hospital;
use crate::core::request::{BloodRequest, NewRequestData};
use crate::core::types::{DonorId, RequestId};
use crate::utils::validation::ValidationError;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Failed to read directory: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse directory: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to write directory to {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid submission: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Directory is full: {0}")]
    Full(String),

    #[error("Directory lock poisoned")]
    LockPoisoned,
}

/// Source of registered donors
pub trait DonorDirectory: Send + Sync {
    fn list_donors(&self) -> Result<Vec<Donor>, DirectoryError>;

    /// Validate and store a new donor, returning its assigned id
    fn create_donor(&self, data: &NewDonorData) -> Result<DonorId, DirectoryError>;
}

/// Source of open blood requests
pub trait RequestDirectory: Send + Sync {
    fn list_requests(&self) -> Result<Vec<BloodRequest>, DirectoryError>;

    /// Validate and store a new request, returning its assigned id
    fn create_request(&self, data: &NewRequestData) -> Result<RequestId, DirectoryError>;
}

/// Source of hospital reference data
pub trait HospitalDirectory: Send + Sync {
    fn list_hospitals(&self) -> Result<Vec<Hospital>, DirectoryError>;
}

/// Donor snapshot, or an empty one if the directory cannot be read
pub fn donors_or_empty(directory: &dyn DonorDirectory) -> Vec<Donor> {
    directory.list_donors().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Donor directory unavailable, using empty snapshot");
        Vec::new()
    })
}

/// Request snapshot, or an empty one if the directory cannot be read
pub fn requests_or_empty(directory: &dyn RequestDirectory) -> Vec<BloodRequest> {
    directory.list_requests().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Request directory unavailable, using empty snapshot");
        Vec::new()
    })
}

/// Hospital snapshot, or an empty one if the directory cannot be read
pub fn hospitals_or_empty(directory: &dyn HospitalDirectory) -> Vec<Hospital> {
    directory.list_hospitals().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Hospital directory unavailable, using empty snapshot");
        Vec::new()
    })
}
