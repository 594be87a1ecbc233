//! Field resolution from labeled entity spans.
//!
//! The spans come from an external entity recognizer. A span is used when its
//! text mentions one of the field keywords; the value is the last whitespace
//! separated token of the span.

use serde::{Deserialize, Serialize};

use super::PartialFields;
use crate::types::{Flow, OrderId};

/// A span of text labeled by an entity recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSpan {
    /// The span text as it appears in the message.
    pub text: String,
    /// Recognizer label (e.g. `NOUN`, `ORG`). Informational only.
    #[serde(default)]
    pub label: String,
}

impl LabeledSpan {
    /// Create a new span.
    #[must_use]
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Resolve whatever fields the spans provide.
///
/// Keywords are checked in the order `flow`, `order id`, `error`; a span
/// feeds at most one field and the first span per field wins. An order id
/// taken from a span must be numeric, otherwise it is ignored.
#[must_use]
pub fn fields_from_spans(spans: &[LabeledSpan]) -> PartialFields {
    let mut fields = PartialFields::default();

    for span in spans {
        let lower = span.text.to_lowercase();
        let Some(value) = span.text.split_whitespace().last() else {
            continue;
        };

        if lower.contains("flow") {
            if fields.flow.is_none() {
                fields.flow = Flow::single(value);
            }
        } else if lower.contains("order id") {
            if fields.order_id.is_none() {
                fields.order_id = OrderId::parse(value).ok();
            }
        } else if lower.contains("error") && fields.error.is_none() {
            fields.error = Some(value.to_owned());
        }
    }

    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_spans() {
        assert_eq!(fields_from_spans(&[]), PartialFields::default());
    }

    #[test]
    fn test_last_token_is_value() {
        let spans = [
            LabeledSpan::new("the checkout flow", "NOUN"),
            LabeledSpan::new("order id 42", "NOUN"),
            LabeledSpan::new("error timeout", "NOUN"),
        ];
        let fields = fields_from_spans(&spans);

        assert_eq!(fields.flow, Some(Flow::Single("flow".into())));
        assert_eq!(fields.order_id.unwrap().as_str(), "42");
        assert_eq!(fields.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let spans = [LabeledSpan::new("Flow Checkout", "ORG")];
        assert_eq!(
            fields_from_spans(&spans).flow,
            Some(Flow::Single("Checkout".into()))
        );
    }

    #[test]
    fn test_flow_keyword_takes_precedence_within_span() {
        // Mentions both flow and error; only the flow field is fed.
        let spans = [LabeledSpan::new("error in flow signup", "NOUN")];
        let fields = fields_from_spans(&spans);

        assert_eq!(fields.flow, Some(Flow::Single("signup".into())));
        assert_eq!(fields.error, None);
    }

    #[test]
    fn test_first_span_per_field_wins() {
        let spans = [
            LabeledSpan::new("order id 1", "NOUN"),
            LabeledSpan::new("order id 2", "NOUN"),
        ];
        assert_eq!(fields_from_spans(&spans).order_id.unwrap().as_str(), "1");
    }

    #[test]
    fn test_non_numeric_order_id_ignored() {
        let spans = [LabeledSpan::new("order id", "NOUN")];
        assert_eq!(fields_from_spans(&spans).order_id, None);
    }

    #[test]
    fn test_blank_span_skipped() {
        let spans = [LabeledSpan::new("   ", "NOUN")];
        assert_eq!(fields_from_spans(&spans), PartialFields::default());
    }

    #[test]
    fn test_label_defaults_when_missing() {
        let span: LabeledSpan = serde_json::from_str(r#"{"text": "flow x"}"#).unwrap();
        assert_eq!(span.label, "");
    }
}
