//! Generative text service integration.
//!
//! Digests and match explanations may be delegated to an external
//! generative service. The service sits behind the [`TextService`] trait so
//! it can be swapped (or mocked) without touching the deterministic ranking
//! core.
//!
//! ## Response contract
//!
//! | Call              | Expected JSON                                            |
//! |-------------------|----------------------------------------------------------|
//! | `summarize`       | `{"summary": "..."}`                                     |
//! | `suggest-matches` | `{"suggestedDonors": [{bloodType, location, matchReason}]}` |
//!
//! Responses are validated before use. A shape mismatch is a
//! [`TextServiceError::MalformedResponse`], never a panic, and no call ever
//! falls back to invented content. Callers decide whether to surface the
//! error or substitute their own text.

pub mod client;
pub mod schema;

pub use client::{HttpTextService, TextService};
pub use schema::{SuggestMatchesPayload, SuggestedDonor};

use thiserror::Error;

use crate::core::donor::Donor;
use crate::matching::MatchRequest;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextServiceError {
    #[error("text service is not configured")]
    NotConfigured,

    #[error("text service unreachable: {0}")]
    Transport(String),

    #[error("text service timed out")]
    Timeout,

    #[error("text service returned HTTP {0}")]
    Status(u16),

    #[error("text service returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Ask the service to suggest and explain matches for `request` among `donors`
///
/// # Errors
///
/// Propagates any `TextServiceError` from the service.
pub async fn suggest_matches(
    service: &dyn TextService,
    request: &MatchRequest,
    donors: &[Donor],
) -> Result<Vec<SuggestedDonor>, TextServiceError> {
    let payload = SuggestMatchesPayload::new(request, donors);
    service.suggest_matches(&payload).await
}
