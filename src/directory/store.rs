use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::donor::{Donor, NewDonorData};
use crate::core::hospital::Hospital;
use crate::core::request::{BloodRequest, NewRequestData};
use crate::core::types::{DonorId, RequestId};
use crate::directory::{DirectoryError, DonorDirectory, HospitalDirectory, RequestDirectory};
use crate::utils::validation::{check_record_limit, MAX_DONOR_POOL, MAX_OPEN_REQUESTS};

/// Directory file version for compatibility checking
pub const DIRECTORY_VERSION: &str = "1.0.0";

const DONOR_ID_PREFIX: &str = "DNR";
const REQUEST_ID_PREFIX: &str = "REQ";

/// On-disk format. Records stay raw so one bad entry does not reject the file.
#[derive(Debug, Deserialize)]
struct RawDirectoryData {
    version: String,
    #[serde(default)]
    donors: Vec<serde_json::Value>,
    #[serde(default)]
    requests: Vec<serde_json::Value>,
    #[serde(default)]
    hospitals: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct DirectoryData<'a> {
    version: &'a str,
    created_at: String,
    donors: &'a [Donor],
    requests: &'a [BloodRequest],
    hospitals: &'a [Hospital],
}

#[derive(Debug, Default)]
struct Records {
    donors: Vec<Donor>,
    requests: Vec<BloodRequest>,
    hospitals: Vec<Hospital>,
}

/// Donor and request directory backed by a JSON file.
///
/// Records live in memory behind an `RwLock`. When a backing path is set,
/// every successful create rewrites the file; if that write fails the new
/// record is rolled back and the error returned.
///
/// Persisting is a synchronous file write made while the write lock is held,
/// so concurrent creates cannot interleave their files. Async callers should
/// run creates on a blocking thread.
#[derive(Debug, Default)]
pub struct JsonDirectory {
    records: RwLock<Records>,
    path: Option<PathBuf>,
    limits: RecordLimits,
}

/// Maximum number of donors and requests a directory accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLimits {
    pub donors: usize,
    pub requests: usize,
}

impl Default for RecordLimits {
    fn default() -> Self {
        Self {
            donors: MAX_DONOR_POOL,
            requests: MAX_OPEN_REQUESTS,
        }
    }
}

impl JsonDirectory {
    /// Create an empty, in-memory directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the embedded seed directory
    pub fn load_embedded() -> Result<Self, DirectoryError> {
        // Validated at compile time by build.rs
        const EMBEDDED_DIRECTORY: &str = include_str!("../../directory/seed.json");
        Self::from_json(EMBEDDED_DIRECTORY)
    }

    /// Load a directory from a JSON file and persist subsequent writes to it
    pub fn load_from_file(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?.with_path(path))
    }

    /// Open `path` if it exists, otherwise start from the embedded seed.
    ///
    /// Either way, writes are persisted to `path`.
    pub fn open(path: &Path) -> Result<Self, DirectoryError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(path = %path.display(), "Directory file not found, starting from seed");
            Ok(Self::load_embedded()?.with_path(path))
        }
    }

    /// Parse a directory from a JSON string.
    ///
    /// Records that do not deserialize (for example a non-canonical blood
    /// type) are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let data: RawDirectoryData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != DIRECTORY_VERSION {
            tracing::warn!(
                expected = DIRECTORY_VERSION,
                found = %data.version,
                "Directory version mismatch"
            );
        }

        let records = Records {
            donors: parse_records(data.donors, "donor"),
            requests: parse_records(data.requests, "request"),
            hospitals: parse_records(data.hospitals, "hospital"),
        };

        Ok(Self {
            records: RwLock::new(records),
            path: None,
            limits: RecordLimits::default(),
        })
    }

    /// Set the file that writes are persisted to
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Override the record limits
    #[must_use]
    pub fn with_limits(mut self, limits: RecordLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Export the directory to JSON
    pub fn to_json(&self) -> Result<String, DirectoryError> {
        let records = self.read()?;
        render(&records)
    }

    /// Number of donors
    pub fn donor_count(&self) -> Result<usize, DirectoryError> {
        Ok(self.read()?.donors.len())
    }

    /// Number of requests
    pub fn request_count(&self) -> Result<usize, DirectoryError> {
        Ok(self.read()?.requests.len())
    }

    /// Number of hospitals
    pub fn hospital_count(&self) -> Result<usize, DirectoryError> {
        Ok(self.read()?.hospitals.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>, DirectoryError> {
        self.records.read().map_err(|_| DirectoryError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>, DirectoryError> {
        self.records.write().map_err(|_| DirectoryError::LockPoisoned)
    }

    fn persist(&self, records: &Records) -> Result<(), DirectoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = render(records)?;
        std::fs::write(path, json).map_err(|source| DirectoryError::WriteError {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Persisted directory");
        Ok(())
    }

    /// Create a request with an explicit timestamp
    pub fn create_request_at(
        &self,
        data: &NewRequestData,
        posted_at: DateTime<Utc>,
    ) -> Result<RequestId, DirectoryError> {
        let valid = data.validate()?;

        let mut records = self.write()?;
        if let Some(msg) =
            check_record_limit("requests", records.requests.len() + 1, self.limits.requests)
        {
            return Err(DirectoryError::Full(msg));
        }

        let id = RequestId::new(next_id(
            REQUEST_ID_PREFIX,
            records.requests.iter().map(|r| r.id.0.as_str()),
        ));
        records.requests.push(valid.into_request(id.clone(), posted_at));

        if let Err(e) = self.persist(&records) {
            records.requests.pop();
            return Err(e);
        }

        tracing::info!(id = %id, "Created request");
        Ok(id)
    }
}

impl DonorDirectory for JsonDirectory {
    fn list_donors(&self) -> Result<Vec<Donor>, DirectoryError> {
        Ok(self.read()?.donors.clone())
    }

    fn create_donor(&self, data: &NewDonorData) -> Result<DonorId, DirectoryError> {
        let valid = data.validate()?;

        let mut records = self.write()?;
        if let Some(msg) =
            check_record_limit("donors", records.donors.len() + 1, self.limits.donors)
        {
            return Err(DirectoryError::Full(msg));
        }

        let id = DonorId::new(next_id(
            DONOR_ID_PREFIX,
            records.donors.iter().map(|d| d.id.0.as_str()),
        ));
        records.donors.push(valid.into_donor(id.clone()));

        if let Err(e) = self.persist(&records) {
            records.donors.pop();
            return Err(e);
        }

        tracing::info!(id = %id, "Registered donor");
        Ok(id)
    }
}

impl RequestDirectory for JsonDirectory {
    fn list_requests(&self) -> Result<Vec<BloodRequest>, DirectoryError> {
        Ok(self.read()?.requests.clone())
    }

    fn create_request(&self, data: &NewRequestData) -> Result<RequestId, DirectoryError> {
        self.create_request_at(data, Utc::now())
    }
}

impl HospitalDirectory for JsonDirectory {
    fn list_hospitals(&self) -> Result<Vec<Hospital>, DirectoryError> {
        Ok(self.read()?.hospitals.clone())
    }
}

fn render(records: &Records) -> Result<String, DirectoryError> {
    let data = DirectoryData {
        version: DIRECTORY_VERSION,
        created_at: Utc::now().to_rfc3339(),
        donors: &records.donors,
        requests: &records.requests,
        hospitals: &records.hospitals,
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

fn parse_records<T: serde::de::DeserializeOwned>(raw: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, index, error = %e, "Skipping invalid directory record");
                None
            }
        })
        .collect()
}

/// Next sequential id: one past the highest numeric suffix in use
fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let highest = existing
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:03}", highest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BloodType, UrgencyLevel};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn new_donor(name: &str) -> NewDonorData {
        NewDonorData {
            name: name.to_string(),
            blood_type: "b-".to_string(),
            location: "Khulna".to_string(),
            contact: "01711111111".to_string(),
        }
    }

    fn new_request() -> NewRequestData {
        NewRequestData {
            patient_name: "Nusrat Jahan".to_string(),
            blood_type: "AB-".to_string(),
            location: "Barishal".to_string(),
            urgency: "medium".to_string(),
            contact: "01822222222".to_string(),
            hospital_name: Some("Sher-e-Bangla Medical College".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_load_embedded_directory() {
        let directory = JsonDirectory::load_embedded().unwrap();
        assert_eq!(directory.donor_count().unwrap(), 5);
        assert_eq!(directory.request_count().unwrap(), 4);
        assert_eq!(directory.hospital_count().unwrap(), 6);

        let hospitals = directory.list_hospitals().unwrap();
        assert_eq!(hospitals[4].id.0, "HOS005");
        assert_eq!(hospitals[4].location, "Chittagong");
        assert!(hospitals[4].offers("blood bank"));

        let donors = directory.list_donors().unwrap();
        assert_eq!(donors[1].id.0, "DNR002");
        assert_eq!(donors[1].blood_type, BloodType::ONeg);
        assert_eq!(donors[1].location, "Chittagong");
    }

    #[test]
    fn test_sequential_ids() {
        let directory = JsonDirectory::load_embedded().unwrap();

        let id = directory.create_donor(&new_donor("Tanvir Rahman")).unwrap();
        assert_eq!(id.0, "DNR006");
        let id = directory.create_donor(&new_donor("Shirin Akter")).unwrap();
        assert_eq!(id.0, "DNR007");

        let id = directory.create_request(&new_request()).unwrap();
        assert_eq!(id.0, "REQ005");
    }

    #[test]
    fn test_create_donor_canonicalizes() {
        let directory = JsonDirectory::new();
        directory.create_donor(&new_donor("  Tanvir Rahman ")).unwrap();

        let donors = directory.list_donors().unwrap();
        assert_eq!(donors[0].id.0, "DNR001");
        assert_eq!(donors[0].name, "Tanvir Rahman");
        assert_eq!(donors[0].blood_type, BloodType::BNeg);
    }

    #[test]
    fn test_create_rejects_invalid_payload() {
        let directory = JsonDirectory::new();
        let mut data = new_donor("Tanvir Rahman");
        data.blood_type = "C+".to_string();

        assert!(matches!(
            directory.create_donor(&data),
            Err(DirectoryError::Invalid(_))
        ));
        assert_eq!(directory.donor_count().unwrap(), 0);
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("directory.json");

        let directory = JsonDirectory::open(&path).unwrap();
        let posted_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        directory.create_request_at(&new_request(), posted_at).unwrap();
        assert!(path.exists());

        let reloaded = JsonDirectory::load_from_file(&path).unwrap();
        let requests = reloaded.list_requests().unwrap();
        assert_eq!(requests.len(), 5);

        let created = requests.last().unwrap();
        assert_eq!(created.id.0, "REQ005");
        assert_eq!(created.urgency, UrgencyLevel::Medium);
        assert_eq!(created.posted_at, posted_at);

        // Hospitals survive the rewrite
        assert_eq!(reloaded.hospital_count().unwrap(), 6);
    }

    #[test]
    fn test_record_limits_apply_to_requests_and_donors() {
        let directory = JsonDirectory::load_embedded().unwrap().with_limits(RecordLimits {
            donors: 5,
            requests: 5,
        });

        assert_eq!(directory.create_request(&new_request()).unwrap().0, "REQ005");
        assert!(matches!(
            directory.create_request(&new_request()),
            Err(DirectoryError::Full(_))
        ));
        assert_eq!(directory.request_count().unwrap(), 5);

        assert!(matches!(
            directory.create_donor(&new_donor("Tanvir Rahman")),
            Err(DirectoryError::Full(_))
        ));
        assert_eq!(directory.donor_count().unwrap(), 5);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("directory.json");

        let directory = JsonDirectory::load_embedded().unwrap().with_path(&path);
        let result = directory.create_donor(&new_donor("Tanvir Rahman"));

        assert!(matches!(result, Err(DirectoryError::WriteError { .. })));
        assert_eq!(directory.donor_count().unwrap(), 5);
    }

    #[test]
    fn test_invalid_records_skipped() {
        let json = r#"{
            "version": "1.0.0",
            "donors": [
                {"id": "DNR001", "name": "Karim", "blood_type": "A+", "location": "Dhaka", "contact": "017"},
                {"id": "DNR002", "name": "Bad", "blood_type": "A", "location": "Dhaka", "contact": "017"}
            ],
            "requests": [
                {"id": "REQ001", "patient_name": "X", "blood_type": "O-", "location": "Dhaka",
                 "urgency": "Critical", "contact": "017", "posted_at": "2025-05-20T07:00:00Z"}
            ]
        }"#;

        let directory = JsonDirectory::from_json(json).unwrap();
        assert_eq!(directory.donor_count().unwrap(), 1);
        assert_eq!(directory.request_count().unwrap(), 0);
    }

    #[test]
    fn test_to_json() {
        let directory = JsonDirectory::load_embedded().unwrap();
        let json = directory.to_json().unwrap();

        assert!(json.contains("\"version\""));
        assert!(json.contains("\"donors\""));
        assert!(json.contains("DNR005"));
        assert!(json.contains("HOS006"));
    }

    #[test]
    fn test_next_id_ignores_foreign_ids() {
        let ids = ["DNR002", "legacy-7", "DNR010", "DNRx"];
        assert_eq!(next_id("DNR", ids.into_iter()), "DNR011");
        assert_eq!(next_id("REQ", std::iter::empty()), "REQ001");
    }
}
