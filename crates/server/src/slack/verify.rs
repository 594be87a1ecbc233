//! Slack request verification.
//!
//! Wraps [`issuedesk_core::signature`] with header extraction and a replay
//! window:
//! <https://api.slack.com/authentication/verifying-requests-from-slack>

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use issuedesk_core::signature::verify_signature;

use super::error::SlackError;

/// Timestamp header, with a generic fallback.
const TIMESTAMP_HEADERS: [&str; 2] = ["X-Slack-Request-Timestamp", "X-Signature-Timestamp"];
/// Signature header, with a generic fallback.
const SIGNATURE_HEADERS: [&str; 2] = ["X-Slack-Signature", "X-Signature"];

/// Verifies signed Slack requests.
#[derive(Clone)]
pub struct RequestVerifier {
    signing_secret: SecretString,
    max_age: Option<Duration>,
}

impl std::fmt::Debug for RequestVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestVerifier")
            .field("signing_secret", &"[REDACTED]")
            .field("max_age", &self.max_age)
            .finish()
    }
}

fn first_header<'a>(headers: &'a HeaderMap, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
}

impl RequestVerifier {
    /// Create a verifier. `max_age` of `None` disables the replay check.
    #[must_use]
    pub const fn new(signing_secret: SecretString, max_age: Option<Duration>) -> Self {
        Self {
            signing_secret,
            max_age,
        }
    }

    /// Verify a request from its headers and raw body.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::InvalidSignature`] when a header is missing, the
    /// timestamp is outside the replay window, or the signature does not match.
    pub fn verify_request(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), SlackError> {
        let timestamp = first_header(headers, &TIMESTAMP_HEADERS)
            .ok_or_else(|| SlackError::InvalidSignature("Missing timestamp header".to_string()))?;
        let signature = first_header(headers, &SIGNATURE_HEADERS)
            .ok_or_else(|| SlackError::InvalidSignature("Missing signature header".to_string()))?;

        self.verify(timestamp, body, signature, SystemTime::now())
    }

    /// Verify a signature against an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::InvalidSignature`] on a bad timestamp, a stale
    /// request, or a signature mismatch.
    #[instrument(skip(self, body, signature, now))]
    pub fn verify(
        &self,
        timestamp: &str,
        body: &[u8],
        signature: &str,
        now: SystemTime,
    ) -> Result<(), SlackError> {
        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SlackError::InvalidSignature("Invalid timestamp".to_string()))?;

        if let Some(max_age) = self.max_age {
            let now_secs = now
                .duration_since(UNIX_EPOCH)
                .map_err(|e| SlackError::InvalidSignature(e.to_string()))?
                .as_secs();
            let now = i64::try_from(now_secs)
                .map_err(|_| SlackError::InvalidSignature("System time overflow".to_string()))?;

            if now.abs_diff(ts) > max_age.as_secs() {
                return Err(SlackError::InvalidSignature(
                    "Request timestamp outside replay window".to_string(),
                ));
            }
        }

        if !verify_signature(
            self.signing_secret.expose_secret().as_bytes(),
            timestamp,
            body,
            signature,
        ) {
            return Err(SlackError::InvalidSignature(
                "Signature mismatch".to_string(),
            ));
        }

        debug!("Slack signature verified");

        Ok(())
    }
}
