//! Field extraction from free-form report text.
//!
//! A report needs three fields: an order id, a flow, and an error
//! description. Two strategies feed them:
//!
//! - [`entities`] - values taken from labeled spans produced by an external
//!   entity recognizer. Preferred per field when present.
//! - [`patterns`] - keyword-anchored regular expressions. Fill whatever the
//!   spans left unresolved.
//!
//! Extraction is all-or-nothing: if any field is still missing after both
//! strategies, the whole extraction fails and nothing may be stored.
//!
//! # Example
//!
//! ```
//! use issuedesk_core::extract::extract_text;
//! use issuedesk_core::Flow;
//!
//! let fields = extract_text("order id: 42 flow: checkout error: timeout").unwrap();
//! assert_eq!(fields.order_id.as_str(), "42");
//! assert_eq!(fields.flow, Flow::Single("checkout".into()));
//! assert_eq!(fields.error, "timeout");
//!
//! assert!(extract_text("flow: checkout error: timeout").is_err());
//! ```

pub mod entities;
pub mod patterns;

use core::fmt;

use crate::types::{Flow, OrderId};

pub use entities::LabeledSpan;

/// Version of the extraction contract, stored with every report.
///
/// Bump when the keyword grammar or the flow representation changes.
pub const EXTRACTOR_VERSION: u16 = 3;

/// One of the three required report fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Flow,
    OrderId,
    Error,
}

impl Field {
    /// Keyword used for the field in report text.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::OrderId => "order id",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Extraction failed because one or more fields could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<Field>),
}

impl ExtractionError {
    /// The fields that could not be resolved.
    #[must_use]
    pub fn missing(&self) -> &[Field] {
        match self {
            Self::MissingFields(fields) => fields,
        }
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::keyword)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fields resolved by a single strategy. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFields {
    pub flow: Option<Flow>,
    pub order_id: Option<OrderId>,
    pub error: Option<String>,
}

impl PartialFields {
    /// Keep the fields already resolved, fill the rest from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            flow: self.flow.or(fallback.flow),
            order_id: self.order_id.or(fallback.order_id),
            error: self.error.or(fallback.error),
        }
    }

    /// Whether every field is resolved.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.flow.is_some() && self.order_id.is_some() && self.error.is_some()
    }

    /// Turn into a complete set of fields, or report what is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::MissingFields`] listing every unresolved
    /// field, in `flow`, `order id`, `error` order.
    pub fn complete(self) -> Result<ExtractedFields, ExtractionError> {
        match (self.flow, self.order_id, self.error) {
            (Some(flow), Some(order_id), Some(error)) => Ok(ExtractedFields {
                order_id,
                flow,
                error,
            }),
            (flow, order_id, error) => {
                let missing = [
                    (flow.is_none(), Field::Flow),
                    (order_id.is_none(), Field::OrderId),
                    (error.is_none(), Field::Error),
                ]
                .into_iter()
                .filter_map(|(is_missing, field)| is_missing.then_some(field))
                .collect();

                Err(ExtractionError::MissingFields(missing))
            }
        }
    }
}

/// A complete set of report fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub order_id: OrderId,
    pub flow: Flow,
    pub error: String,
}

/// Extract report fields from text, preferring values found in `spans`.
///
/// # Errors
///
/// Returns [`ExtractionError::MissingFields`] when any field is unresolved
/// after both strategies.
pub fn extract(text: &str, spans: &[LabeledSpan]) -> Result<ExtractedFields, ExtractionError> {
    let from_spans = entities::fields_from_spans(spans);
    if from_spans.is_complete() {
        return from_spans.complete();
    }

    from_spans.or(patterns::fields_from_text(text)).complete()
}

/// Extract report fields from text with the pattern strategy alone.
///
/// # Errors
///
/// Returns [`ExtractionError::MissingFields`] when any field is unresolved.
pub fn extract_text(text: &str) -> Result<ExtractedFields, ExtractionError> {
    extract(text, &[])
}
