//! Integration tests for report field extraction.
//!
//! Exercises the public extraction API the way the webhook uses it: pattern
//! matching over whole messages, combined with recognizer spans.

#![allow(clippy::unwrap_used)]

use issuedesk_core::extract::{EXTRACTOR_VERSION, Field, LabeledSpan, extract, extract_text};
use issuedesk_core::{Flow, IssueReport, ReportSource};

// =============================================================================
// Keyword Variants
// =============================================================================

#[test]
fn test_delimiter_and_case_variants_resolve_alike() {
    for text in [
        "order id: 42 flow: checkout error: timeout",
        "ORDER ID:42 FLOW:checkout ERROR:timeout",
        "order_id=42 flow=checkout error=timeout",
        "Order ID 42   Flow :  checkout   Error =  timeout",
        "flow: checkout\norder id: 42\nerror: timeout",
    ] {
        let fields = extract_text(text).unwrap();
        assert_eq!(fields.order_id.as_str(), "42", "input: {text}");
        assert_eq!(fields.flow, Flow::Single("checkout".into()), "input: {text}");
        assert_eq!(fields.error, "timeout", "input: {text}");
    }
}

#[test]
fn test_field_order_does_not_matter() {
    let fields = extract_text("error: card declined order id: 17 flow: payment").unwrap();

    assert_eq!(fields.order_id.as_str(), "17");
    assert_eq!(fields.flow, Flow::Single("payment".into()));
    assert_eq!(fields.error, "card declined");
}

#[test]
fn test_list_flow() {
    let fields = extract_text("order_id=7 flow={a, b} error=bad state").unwrap();

    assert_eq!(fields.order_id.as_str(), "7");
    assert_eq!(fields.flow, Flow::List(vec!["a".into(), "b".into()]));
    assert_eq!(fields.error, "bad state");
}

#[test]
fn test_bare_comma_flow_keeps_every_entry() {
    let fields = extract_text("order id: 42 flow: checkout, payment error: timeout").unwrap();

    assert_eq!(
        fields.flow,
        Flow::List(vec!["checkout".into(), "payment".into()])
    );
    assert_eq!(fields.error, "timeout");
}

#[test]
fn test_error_ends_at_delimited_keyword() {
    let fields =
        extract_text("flow: checkout error: could not load order id: 99 from cache").unwrap();

    assert_eq!(fields.error, "could not load");
    assert_eq!(fields.order_id.as_str(), "99");
}

#[test]
fn test_first_occurrence_wins() {
    let fields =
        extract_text("order id: 1 flow: first error: boom order id: 2 flow: second").unwrap();

    assert_eq!(fields.order_id.as_str(), "1");
    assert_eq!(fields.flow, Flow::Single("first".into()));
    assert_eq!(fields.error, "boom");
}

// =============================================================================
// All Or Nothing
// =============================================================================

#[test]
fn test_each_missing_field_is_reported() {
    let cases = [
        ("flow: checkout error: timeout", vec![Field::OrderId]),
        ("order id: 42 error: timeout", vec![Field::Flow]),
        ("order id: 42 flow: checkout", vec![Field::Error]),
        ("", vec![Field::Flow, Field::OrderId, Field::Error]),
    ];

    for (text, expected) in cases {
        let err = extract_text(text).unwrap_err();
        assert_eq!(err.missing(), expected.as_slice(), "input: {text:?}");
    }
}

#[test]
fn test_non_numeric_order_id_is_missing() {
    let err = extract_text("order id: ABC flow: checkout error: timeout").unwrap_err();
    assert_eq!(err.missing(), &[Field::OrderId]);
}

#[test]
fn test_empty_error_is_missing() {
    let err = extract_text("order id: 42 flow: checkout error:   ").unwrap_err();
    assert_eq!(err.missing(), &[Field::Error]);
}

// =============================================================================
// Recognizer Spans
// =============================================================================

#[test]
fn test_spans_fill_fields_patterns_miss() {
    let spans = [LabeledSpan::new("flow checkout", "NOUN")];

    let fields = extract("order id: 42 error: timeout", &spans).unwrap();

    assert_eq!(fields.flow, Flow::Single("checkout".into()));
}

#[test]
fn test_span_with_non_numeric_order_id_falls_back_to_patterns() {
    let spans = [LabeledSpan::new("order id abc", "NOUN")];

    let fields = extract("order id: 42 flow: checkout error: timeout", &spans).unwrap();

    assert_eq!(fields.order_id.as_str(), "42");
}

// =============================================================================
// Report Assembly
// =============================================================================

#[test]
fn test_report_keeps_original_input() {
    let text = "order id: 0042 flow: checkout error: timeout";
    let fields = extract_text(text).unwrap();

    let report = IssueReport::new(
        fields,
        ReportSource::Event,
        Some("U1".into()),
        text,
        chrono::Utc::now(),
    );

    assert_eq!(report.order_id.as_str(), "0042");
    assert_eq!(report.original_input, text);
    assert_eq!(report.extractor_version, EXTRACTOR_VERSION);
}
