//! Keyword-anchored regular expressions for the three report fields.
//!
//! Every field resolves independently and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

use super::PartialFields;
use crate::types::{Flow, OrderId};

/// Matches a flow value.
///
/// Matches: `flow: checkout`, `FLOW = checkout`, `flow: a, b`, `flow={a, b}`, `flow: [a, b]`
static FLOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bflow\s*[:=]\s*(?:\{([^}]*)\}|\[([^\]]*)\]|([\w./-]+(?:\s*,\s*[\w./-]+)*))",
    )
    .expect("Invalid regex")
});

/// Matches an order id.
///
/// Matches: `order id: 42`, `order_id=7`, `Order ID 42`, `order id #42`
static ORDER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\border[\s_]*id\b\s*[:=]?\s*#?(\d+)").expect("Invalid regex")
});

/// Matches the start of an error description.
static ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\berror\s*[:=]\s*").expect("Invalid regex"));

/// Matches a delimited flow or order id keyword, which ends an error description.
static NEXT_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:flow|order[\s_]*id)\s*[:=]").expect("Invalid regex")
});

/// Matches a delimited field keyword at the start of the input.
static FIELD_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:flow|error|order[\s_]*id)\s*[:=]").expect("Invalid regex")
});

/// Resolve all three fields from text.
pub fn fields_from_text(text: &str) -> PartialFields {
    PartialFields {
        flow: flow(text),
        order_id: order_id(text),
        error: error(text),
    }
}

/// First flow value in the text.
///
/// A braced, bracketed or bare comma separated value is a list, anything
/// else a single token.
pub fn flow(text: &str) -> Option<Flow> {
    let caps = FLOW_RE.captures(text)?;

    if let Some(list) = caps.get(1).or_else(|| caps.get(2)) {
        return Flow::list(list.as_str());
    }

    let bare = caps.get(3)?;
    let mut value = bare.as_str();

    // An entry that opens the next field is not part of the list
    while let Some(comma) = value.rfind(',') {
        let rest = text.get(bare.start() + comma + 1..).unwrap_or_default();
        if !FIELD_KEYWORD_RE.is_match(rest.trim_start()) {
            break;
        }
        value = value.get(..comma).unwrap_or_default();
    }

    if value.contains(',') {
        Flow::list(value)
    } else {
        Flow::single(value)
    }
}

/// First order id in the text.
pub fn order_id(text: &str) -> Option<OrderId> {
    let caps = ORDER_ID_RE.captures(text)?;
    caps.get(1).and_then(|m| OrderId::parse(m.as_str()).ok())
}

/// First error description in the text.
///
/// The description runs until the next delimited `flow`/`order id` keyword or
/// the end of the text, so `error: lost order id: 9` yields `lost`. Keywords
/// without `:` or `=` stay part of the description.
pub fn error(text: &str) -> Option<String> {
    let start = ERROR_RE.find(text)?.end();
    let end = NEXT_KEYWORD_RE
        .find_at(text, start)
        .map_or(text.len(), |m| m.start());

    let value = text.get(start..end)?.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_single() {
        assert_eq!(
            flow("flow: checkout order id: 1"),
            Some(Flow::Single("checkout".into()))
        );
        assert_eq!(
            flow("Flow=payment-retry"),
            Some(Flow::Single("payment-retry".into()))
        );
    }

    #[test]
    fn test_flow_braced_list() {
        assert_eq!(
            flow("order_id=7 flow={a, b} error=bad state"),
            Some(Flow::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_flow_bracketed_list() {
        assert_eq!(
            flow("flow: [ signup ,  login ]"),
            Some(Flow::List(vec!["signup".into(), "login".into()]))
        );
    }

    #[test]
    fn test_flow_bare_comma_list() {
        assert_eq!(
            flow("order id: 42 flow: checkout, payment error: timeout"),
            Some(Flow::List(vec!["checkout".into(), "payment".into()]))
        );
        assert_eq!(
            flow("flow=signup ,login,  verify"),
            Some(Flow::List(vec![
                "signup".into(),
                "login".into(),
                "verify".into()
            ]))
        );
    }

    #[test]
    fn test_flow_list_ends_at_last_joined_token() {
        assert_eq!(
            flow("flow: checkout, then it broke"),
            Some(Flow::List(vec!["checkout".into(), "then".into()]))
        );
        assert_eq!(flow("flow: checkout,"), Some(Flow::Single("checkout".into())));
    }

    #[test]
    fn test_flow_list_stops_at_next_field() {
        assert_eq!(
            flow("flow: checkout, error: timeout"),
            Some(Flow::Single("checkout".into()))
        );
        assert_eq!(
            flow("flow: a, b, order id: 5"),
            Some(Flow::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_flow_empty_list_is_unresolved() {
        assert_eq!(flow("flow={ }"), None);
    }

    #[test]
    fn test_flow_requires_delimiter() {
        assert_eq!(flow("the flow checkout broke"), None);
        assert_eq!(flow("workflow: checkout"), None);
    }

    #[test]
    fn test_order_id_variants() {
        for text in [
            "order id: 42",
            "order id:42",
            "ORDER ID  :  42",
            "order_id=42",
            "order_id 42",
            "Order ID 42",
            "order id #42",
        ] {
            assert_eq!(order_id(text).unwrap().as_str(), "42", "input: {text}");
        }
    }

    #[test]
    fn test_order_id_requires_digits() {
        assert_eq!(order_id("order id: abc"), None);
        assert_eq!(order_id("reorder id: 42"), None);
    }

    #[test]
    fn test_order_id_first_match_wins() {
        assert_eq!(
            order_id("order id: 1 and order id: 2").unwrap().as_str(),
            "1"
        );
    }

    #[test]
    fn test_error_runs_to_end() {
        assert_eq!(
            error("order id: 42 flow: checkout error: payment gateway timeout").as_deref(),
            Some("payment gateway timeout")
        );
    }

    #[test]
    fn test_error_stops_at_next_keyword() {
        assert_eq!(
            error("error: card declined flow: checkout order id: 42").as_deref(),
            Some("card declined")
        );
        assert_eq!(
            error("error=bad state order_id=7").as_deref(),
            Some("bad state")
        );
    }

    #[test]
    fn test_error_cut_at_delimited_keyword_inside_text() {
        assert_eq!(
            error("error: could not load order id: 99 from cache").as_deref(),
            Some("could not load")
        );
    }

    #[test]
    fn test_error_keeps_undelimited_keywords() {
        assert_eq!(
            error("error: could not find order id 99 in flow").as_deref(),
            Some("could not find order id 99 in flow")
        );
    }

    #[test]
    fn test_error_empty_is_unresolved() {
        assert_eq!(error("error:   flow: checkout"), None);
        assert_eq!(error("error:"), None);
    }

    #[test]
    fn test_error_spans_lines() {
        assert_eq!(
            error("error: first line\nsecond line").as_deref(),
            Some("first line\nsecond line")
        );
    }
}
