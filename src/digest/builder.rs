use std::collections::HashMap;
use std::fmt::Write as _;

use crate::core::request::RequestSummaryInput;
use crate::core::types::{BloodType, UrgencyLevel};

/// Digest returned when there is nothing to summarize
pub const EMPTY_DIGEST: &str = "No active blood requests to summarize at this time.";

/// Requests sharing a blood type and (normalized) location
#[derive(Debug)]
struct DigestGroup<'a> {
    blood_type: BloodType,
    /// Location as spelled by the first request in the group
    location: &'a str,
    requests: Vec<&'a RequestSummaryInput>,
}

impl DigestGroup<'_> {
    fn highest_urgency(&self) -> UrgencyLevel {
        self.requests
            .iter()
            .map(|r| r.urgency)
            .max()
            .unwrap_or(UrgencyLevel::Low)
    }

    /// Urgency and contact are only worth stating when they tell requests apart
    fn needs_disambiguation(&self) -> bool {
        self.requests.len() > 1
            && self
                .requests
                .iter()
                .any(|r| r.urgency != self.requests[0].urgency)
    }
}

/// Build a short, deterministic digest of open requests.
///
/// Requests are grouped by blood type and by location compared
/// case-insensitively after trimming. Every group names its blood type and
/// location. Urgency and contact only appear for groups holding several
/// requests of differing urgency. Groups are ordered by their most urgent
/// request, then by first appearance.
///
/// # Examples
///
/// ```
/// use donor_match::core::{BloodType, RequestSummaryInput, UrgencyLevel};
/// use donor_match::digest::summarize_requests;
///
/// let requests = vec![
///     RequestSummaryInput::new(BloodType::ONeg, "Dhaka", UrgencyLevel::High, "01776543210"),
///     RequestSummaryInput::new(BloodType::APos, "Chittagong", UrgencyLevel::Medium, "01887654321"),
/// ];
/// let digest = summarize_requests(&requests);
/// assert!(digest.contains("O- in Dhaka"));
/// assert!(digest.contains("A+ in Chittagong"));
/// ```
#[must_use]
pub fn summarize_requests(requests: &[RequestSummaryInput]) -> String {
    if requests.is_empty() {
        return EMPTY_DIGEST.to_string();
    }

    let mut groups = group_requests(requests);
    // Stable sort: groups of equal urgency stay in first-appearance order
    groups.sort_by(|a, b| b.highest_urgency().cmp(&a.highest_urgency()));

    let mut digest = format!(
        "{} across {}:",
        plural(requests.len(), "open blood request", "open blood requests"),
        plural(
            groups.len(),
            "blood type and location combination",
            "blood type and location combinations"
        ),
    );

    for group in &groups {
        let _ = write!(
            digest,
            "\n- {} in {}: {}",
            group.blood_type,
            group.location,
            plural(group.requests.len(), "request", "requests")
        );

        if group.needs_disambiguation() {
            let mut ordered = group.requests.clone();
            ordered.sort_by(|a, b| b.urgency.cmp(&a.urgency));

            let details: Vec<String> = ordered
                .iter()
                .map(|r| format!("{} urgency, contact {}", r.urgency, r.contact.trim()))
                .collect();
            let _ = write!(digest, " ({})", details.join("; "));
        }
    }

    digest
}

fn group_requests(requests: &[RequestSummaryInput]) -> Vec<DigestGroup<'_>> {
    let mut groups: Vec<DigestGroup<'_>> = Vec::new();
    let mut index: HashMap<(BloodType, String), usize> = HashMap::new();

    for request in requests {
        let key = (request.blood_type, request.location.trim().to_lowercase());
        match index.get(&key) {
            Some(&i) => groups[i].requests.push(request),
            None => {
                index.insert(key, groups.len());
                groups.push(DigestGroup {
                    blood_type: request.blood_type,
                    location: request.location.trim(),
                    requests: vec![request],
                });
            }
        }
    }

    groups
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}
