use std::time::Duration;

use async_trait::async_trait;

use crate::core::request::RequestSummaryInput;
use crate::narrative::schema::{
    parse_suggestions_response, parse_summary_response, SuggestMatchesPayload, SuggestedDonor,
    SummaryPayload,
};
use crate::narrative::TextServiceError;

/// Default timeout for a single generation call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Generative text service used for digests and match explanations.
///
/// Implementations must validate the returned shape and report failures as
/// errors; they never substitute invented content.
#[async_trait]
pub trait TextService: Send + Sync {
    /// Summarize a set of open requests into prose
    async fn summarize_requests(
        &self,
        requests: &[RequestSummaryInput],
    ) -> Result<String, TextServiceError>;

    /// Suggest and explain donor matches for a request
    async fn suggest_matches(
        &self,
        payload: &SuggestMatchesPayload,
    ) -> Result<Vec<SuggestedDonor>, TextServiceError>;
}

/// `TextService` backed by a JSON-over-HTTP endpoint.
///
/// Posts to `{endpoint}/summarize` and `{endpoint}/suggest-matches`.
pub struct HttpTextService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTextService {
    /// Build a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `TextServiceError::Transport` if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TextServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TextServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_json<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<serde_json::Value, TextServiceError> {
        let url = format!("{}/{path}", self.endpoint);

        let mut request = self.client.post(&url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Text service returned an error status");
            return Err(TextServiceError::Status(status.as_u16()));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TextServiceError::MalformedResponse(format!("response is not JSON: {e}")))
    }
}

fn classify_transport_error(e: reqwest::Error) -> TextServiceError {
    if e.is_timeout() {
        TextServiceError::Timeout
    } else {
        TextServiceError::Transport(e.to_string())
    }
}

#[async_trait]
impl TextService for HttpTextService {
    async fn summarize_requests(
        &self,
        requests: &[RequestSummaryInput],
    ) -> Result<String, TextServiceError> {
        let body = self
            .post_json("summarize", &SummaryPayload { requests })
            .await?;
        parse_summary_response(&body)
    }

    async fn suggest_matches(
        &self,
        payload: &SuggestMatchesPayload,
    ) -> Result<Vec<SuggestedDonor>, TextServiceError> {
        let body = self.post_json("suggest-matches", payload).await?;
        parse_suggestions_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let service = HttpTextService::new(
            "http://localhost:9000/v1/",
            None,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .unwrap();
        assert_eq!(service.endpoint(), "http://localhost:9000/v1");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let service =
            HttpTextService::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();
        let result = service.summarize_requests(&[]).await;
        assert!(matches!(
            result,
            Err(TextServiceError::Transport(_) | TextServiceError::Timeout)
        ));
    }
}
