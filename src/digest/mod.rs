//! Request digests.
//!
//! A digest is a short summary of the open requests in the directory. It can
//! be produced locally by [`summarize_requests`], which is deterministic and
//! never fails, or delegated to a generative [`TextService`] through
//! [`summarize_with_service`].
//!
//! Service failures are returned to the caller unchanged. Whether to show
//! the error or fall back to the local digest is the caller's decision.

pub mod builder;

pub use builder::{summarize_requests, EMPTY_DIGEST};

use serde::Serialize;

use crate::core::request::RequestSummaryInput;
use crate::narrative::{TextService, TextServiceError};

/// Who produced a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestSource {
    /// The generative text service
    Service,
    /// The deterministic local builder
    Local,
}

impl std::fmt::Display for DigestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Summarize `requests` with a generative text service.
///
/// Empty input returns [`EMPTY_DIGEST`] without calling the service.
///
/// # Errors
///
/// Returns the service's `TextServiceError` on transport failure, timeout,
/// a non-success status, or a response that fails shape validation.
pub async fn summarize_with_service(
    service: &dyn TextService,
    requests: &[RequestSummaryInput],
) -> Result<String, TextServiceError> {
    if requests.is_empty() {
        return Ok(EMPTY_DIGEST.to_string());
    }

    tracing::debug!(count = requests.len(), "Requesting digest from text service");
    service.summarize_requests(requests).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BloodType, UrgencyLevel};
    use crate::narrative::{SuggestMatchesPayload, SuggestedDonor};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedService {
        reply: Result<String, TextServiceError>,
        calls: AtomicUsize,
    }

    impl CannedService {
        fn new(reply: Result<String, TextServiceError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextService for CannedService {
        async fn summarize_requests(
            &self,
            _requests: &[RequestSummaryInput],
        ) -> Result<String, TextServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }

        async fn suggest_matches(
            &self,
            _payload: &SuggestMatchesPayload,
        ) -> Result<Vec<SuggestedDonor>, TextServiceError> {
            Ok(Vec::new())
        }
    }

    fn one_request() -> Vec<RequestSummaryInput> {
        vec![RequestSummaryInput::new(
            BloodType::ONeg,
            "Dhaka",
            UrgencyLevel::High,
            "01776543210",
        )]
    }

    #[tokio::test]
    async fn test_empty_input_skips_service() {
        let service = CannedService::new(Ok("should not be used".to_string()));
        let digest = summarize_with_service(&service, &[]).await.unwrap();

        assert_eq!(digest, EMPTY_DIGEST);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_summary_returned() {
        let service = CannedService::new(Ok("One urgent O- request in Dhaka.".to_string()));
        let digest = summarize_with_service(&service, &one_request())
            .await
            .unwrap();

        assert_eq!(digest, "One urgent O- request in Dhaka.");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let service = CannedService::new(Err(TextServiceError::Timeout));
        let result = summarize_with_service(&service, &one_request()).await;

        assert_eq!(result, Err(TextServiceError::Timeout));
    }

    #[test]
    fn test_digest_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DigestSource::Service).unwrap(),
            "\"service\""
        );
        assert_eq!(DigestSource::Local.to_string(), "local");
    }
}
