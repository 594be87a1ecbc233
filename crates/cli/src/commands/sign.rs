//! Compute a request signature for manual testing.
//!
//! # Usage
//!
//! ```bash
//! BODY='{"challenge":"abc"}'
//! TS=$(date +%s)
//! SIG=$(issuedesk sign --secret "$SLACK_SIGNING_SECRET" --timestamp "$TS" --body "$BODY")
//! curl -X POST localhost:8080/api/slack/events \
//!   -H "X-Slack-Request-Timestamp: $TS" -H "X-Slack-Signature: $SIG" \
//!   -H 'Content-Type: application/json' -d "$BODY"
//! ```

use chrono::Utc;

use issuedesk_core::signature::{SignatureError, compute_signature};

/// Signature for `body`, using the current time when no timestamp is given.
///
/// # Errors
///
/// Returns error if the secret cannot be used as a signing key.
pub fn signature(
    secret: &str,
    timestamp: Option<&str>,
    body: &str,
) -> Result<(String, String), SignatureError> {
    let timestamp = timestamp.map_or_else(|| Utc::now().timestamp().to_string(), String::from);
    let signature = compute_signature(secret.as_bytes(), &timestamp, body.as_bytes())?;
    Ok((timestamp, signature))
}

/// Print the signature (and the timestamp when it was generated).
///
/// # Errors
///
/// Returns error if signing fails.
pub fn run(secret: &str, timestamp: Option<&str>, body: &str) -> Result<(), SignatureError> {
    let (ts, sig) = signature(secret, timestamp, body)?;

    #[allow(clippy::print_stdout)]
    {
        if timestamp.is_none() {
            println!("timestamp: {ts}");
        }
        println!("{sig}");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use issuedesk_core::signature::verify_signature;

    use super::*;

    #[test]
    fn test_signature_with_timestamp() {
        let (ts, sig) = signature("s3cret", Some("1700000000"), "a=b").unwrap();

        assert_eq!(ts, "1700000000");
        assert!(verify_signature(b"s3cret", "1700000000", b"a=b", &sig));
    }

    #[test]
    fn test_signature_generates_timestamp() {
        let (ts, sig) = signature("s3cret", None, "a=b").unwrap();

        assert!(ts.parse::<i64>().is_ok());
        assert!(verify_signature(b"s3cret", &ts, b"a=b", &sig));
    }
}
