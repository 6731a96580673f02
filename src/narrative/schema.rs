use serde::{Deserialize, Serialize};

use crate::core::donor::Donor;
use crate::core::request::RequestSummaryInput;
use crate::core::types::{BloodType, UrgencyLevel};
use crate::matching::MatchRequest;
use crate::narrative::TextServiceError;

/// Payload for a request digest
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPayload<'a> {
    pub requests: &'a [RequestSummaryInput],
}

/// Payload asking the service to suggest and explain donor matches
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestMatchesPayload {
    pub blood_type: BloodType,
    pub location: String,
    pub urgency: UrgencyLevel,
    pub donor_blood_types: Vec<BloodType>,
    pub donor_locations: Vec<String>,
}

impl SuggestMatchesPayload {
    #[must_use]
    pub fn new(request: &MatchRequest, donors: &[Donor]) -> Self {
        Self {
            blood_type: request.blood_type,
            location: request.location.clone(),
            urgency: request.urgency,
            donor_blood_types: donors.iter().map(|d| d.blood_type).collect(),
            donor_locations: donors.iter().map(|d| d.location.clone()).collect(),
        }
    }
}

/// One donor suggestion returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedDonor {
    pub blood_type: BloodType,
    pub location: String,
    pub match_reason: String,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionsResponse {
    suggested_donors: Vec<SuggestedDonor>,
}

/// Deserialize `body` only if it is a JSON object. Derived structs also
/// accept positional arrays, which no service response should be.
fn from_object<T: serde::de::DeserializeOwned>(
    body: &serde_json::Value,
    what: &str,
) -> Result<T, TextServiceError> {
    if !body.is_object() {
        return Err(TextServiceError::MalformedResponse(format!(
            "{what}: expected a JSON object"
        )));
    }
    serde_json::from_value(body.clone())
        .map_err(|e| TextServiceError::MalformedResponse(format!("{what}: {e}")))
}

/// Validate a `{"summary": string}` response.
///
/// # Errors
///
/// Returns `TextServiceError::MalformedResponse` when the shape does not match
/// or the summary is blank.
pub fn parse_summary_response(body: &serde_json::Value) -> Result<String, TextServiceError> {
    let response: SummaryResponse = from_object(body, "summary response")?;

    let summary = response.summary.trim();
    if summary.is_empty() {
        return Err(TextServiceError::MalformedResponse(
            "summary response: empty summary".to_string(),
        ));
    }

    Ok(summary.to_string())
}

/// Validate a `{"suggestedDonors": [...]}` response.
///
/// Every suggestion must carry a canonical blood type and a non-blank reason.
///
/// # Errors
///
/// Returns `TextServiceError::MalformedResponse` on any shape mismatch.
pub fn parse_suggestions_response(
    body: &serde_json::Value,
) -> Result<Vec<SuggestedDonor>, TextServiceError> {
    let response: SuggestionsResponse = from_object(body, "suggestions response")?;

    if let Some(i) = response
        .suggested_donors
        .iter()
        .position(|s| s.match_reason.trim().is_empty())
    {
        return Err(TextServiceError::MalformedResponse(format!(
            "suggestions response: suggestion {i} has no match reason"
        )));
    }

    Ok(response.suggested_donors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_summary() {
        let body = json!({"summary": "  Two requests in Dhaka. "});
        assert_eq!(parse_summary_response(&body).unwrap(), "Two requests in Dhaka.");
    }

    #[test]
    fn test_parse_summary_rejects_wrong_shape() {
        for body in [
            json!({}),
            json!({"summary": 42}),
            json!({"summary": "   "}),
            json!(["summary"]),
        ] {
            assert!(
                matches!(
                    parse_summary_response(&body),
                    Err(TextServiceError::MalformedResponse(_))
                ),
                "{body} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_suggestions() {
        let body = json!({
            "suggestedDonors": [
                {"bloodType": "O-", "location": "Dhaka", "matchReason": "Universal donor nearby"}
            ]
        });
        let suggestions = parse_suggestions_response(&body).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].blood_type, BloodType::ONeg);
    }

    #[test]
    fn test_parse_suggestions_rejects_invalid_blood_type() {
        let body = json!({
            "suggestedDonors": [
                {"bloodType": "O", "location": "Dhaka", "matchReason": "close"}
            ]
        });
        assert!(parse_suggestions_response(&body).is_err());
    }

    #[test]
    fn test_parse_suggestions_rejects_arrays() {
        let suggestion = json!({"bloodType": "O-", "location": "Dhaka", "matchReason": "close"});
        for body in [json!([[suggestion.clone()]]), json!([suggestion]), json!("suggestedDonors")] {
            assert!(
                matches!(
                    parse_suggestions_response(&body),
                    Err(TextServiceError::MalformedResponse(_))
                ),
                "{body} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_suggestions_rejects_blank_reason() {
        let body = json!({
            "suggestedDonors": [
                {"bloodType": "A+", "location": "Dhaka", "matchReason": " "}
            ]
        });
        assert!(parse_suggestions_response(&body).is_err());
    }

    #[test]
    fn test_suggest_payload_shape() {
        let donors = vec![Donor::new("DNR001", "Karim", BloodType::APos, "Dhaka")];
        let request = MatchRequest::new(BloodType::APos, "Dhaka", UrgencyLevel::High);

        let payload = serde_json::to_value(SuggestMatchesPayload::new(&request, &donors)).unwrap();
        assert_eq!(payload["bloodType"], "A+");
        assert_eq!(payload["urgency"], "High");
        assert_eq!(payload["donorBloodTypes"], json!(["A+"]));
        assert_eq!(payload["donorLocations"], json!(["Dhaka"]));
    }
}
