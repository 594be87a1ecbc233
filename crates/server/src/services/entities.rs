//! Entity recognizer clients.
//!
//! The recognizer is an opaque NLP model that labels spans of a message. It
//! only improves extraction; when it is unavailable the pattern strategy
//! still runs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use issuedesk_core::extract::LabeledSpan;

/// Recognizer request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when calling an entity recognizer.
#[derive(Debug, Error)]
pub enum EntityError {
    /// HTTP request failed.
    #[error("recognizer request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Recognizer answered with a non-success status.
    #[error("recognizer returned {0}")]
    Status(reqwest::StatusCode),
}

/// Labels spans of text.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Return the labeled spans found in `text`.
    async fn recognize(&self, text: &str) -> Result<Vec<LabeledSpan>, EntityError>;
}

/// Recognizer used when none is configured. Finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecognizer;

#[async_trait]
impl EntityRecognizer for NoopRecognizer {
    async fn recognize(&self, _text: &str) -> Result<Vec<LabeledSpan>, EntityError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    entities: Vec<LabeledSpan>,
}

/// Recognizer served over HTTP.
///
/// `POST {url}` with `{"text": ...}`, answered by
/// `{"entities": [{"text": ..., "label": ...}]}`.
#[derive(Debug, Clone)]
pub struct HttpEntityRecognizer {
    client: Client,
    url: Url,
}

impl HttpEntityRecognizer {
    /// Create a recognizer client for `url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(url: Url) -> Result<Self, EntityError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl EntityRecognizer for HttpEntityRecognizer {
    #[instrument(skip(self, text), fields(url = %self.url))]
    async fn recognize(&self, text: &str) -> Result<Vec<LabeledSpan>, EntityError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&RecognizeRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EntityError::Status(response.status()));
        }

        let body: RecognizeResponse = response.json().await?;
        debug!(count = body.entities.len(), "Entities recognized");

        Ok(body.entities)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_finds_nothing() {
        let spans = NoopRecognizer.recognize("order id: 42").await.unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_response_parsing() {
        let body: RecognizeResponse = serde_json::from_str(
            r#"{"entities": [{"text": "order id 42", "label": "NOUN"}, {"text": "flow x"}]}"#,
        )
        .unwrap();

        assert_eq!(
            body.entities,
            vec![
                LabeledSpan::new("order id 42", "NOUN"),
                LabeledSpan::new("flow x", ""),
            ]
        );
    }

    #[test]
    fn test_response_without_entities() {
        let body: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(body.entities.is_empty());
    }

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(RecognizeRequest { text: "hi" }).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi"}));
    }
}
