//! Run the field extractor on a piece of text.
//!
//! # Usage
//!
//! ```bash
//! issuedesk parse "order id: 42 flow: checkout error: payment timeout"
//!
//! # With spans from an entity recognizer
//! issuedesk parse "..." --spans '[{"text": "flow signup", "label": "NOUN"}]'
//! ```

use serde_json::{Value, json};
use thiserror::Error;

use issuedesk_core::extract::{EXTRACTOR_VERSION, ExtractionError, LabeledSpan, extract};

/// Errors that can occur while parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// `--spans` was not a JSON array of spans.
    #[error("Invalid spans: {0}")]
    InvalidSpans(#[from] serde_json::Error),

    /// Extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Extract fields from `text` and render them as JSON.
///
/// # Errors
///
/// Returns error if `spans` is not valid JSON or a field is missing.
pub fn render(text: &str, spans: Option<&str>) -> Result<Value, ParseError> {
    let spans: Vec<LabeledSpan> = spans.map(serde_json::from_str).transpose()?.unwrap_or_default();
    let fields = extract(text, &spans)?;

    Ok(json!({
        "order_id": fields.order_id,
        "flow": fields.flow,
        "error": fields.error,
        "extractor_version": EXTRACTOR_VERSION,
    }))
}

/// Print the extraction result.
///
/// # Errors
///
/// Returns error if extraction fails.
pub fn run(text: &str, spans: Option<&str>) -> Result<(), ParseError> {
    let rendered = render(text, spans)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered:#}");
    }

    Ok(())
}
