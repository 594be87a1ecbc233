//! Request signing (Slack `v0` scheme).
//!
//! The signature of a request is
//! `"v0=" + hex(HMAC-SHA256(secret, "v0:" + timestamp + ":" + body))`.
//!
//! See: <https://api.slack.com/authentication/verifying-requests-from-slack>

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature version prefix.
pub const SIGNATURE_VERSION: &str = "v0";

/// Errors computing a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The secret was rejected as an HMAC key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

fn keyed_mac(secret: &[u8], timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Compute the signature for a request.
///
/// # Example
///
/// ```
/// use issuedesk_core::signature::{compute_signature, verify_signature};
///
/// let sig = compute_signature(b"secret", "1700000000", b"token=abc").unwrap();
/// assert!(sig.starts_with("v0="));
/// assert!(verify_signature(b"secret", "1700000000", b"token=abc", &sig));
/// ```
///
/// # Errors
///
/// Returns [`SignatureError::InvalidKey`] if the secret is not a usable key.
pub fn compute_signature(
    secret: &[u8],
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let digest = keyed_mac(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
}

/// Verify a caller-supplied signature.
///
/// The digest comparison is constant-time. Malformed signatures (wrong
/// prefix, bad hex, wrong length) and unusable secrets fail verification.
#[must_use]
pub fn verify_signature(secret: &[u8], timestamp: &str, body: &[u8], signature: &str) -> bool {
    let Some(hex_digest) = signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|rest| rest.strip_prefix('='))
    else {
        return false;
    };

    let Ok(supplied) = hex::decode(hex_digest) else {
        return false;
    };

    keyed_mac(secret, timestamp, body)
        .is_ok_and(|mac| mac.verify_slice(&supplied).is_ok())
}
