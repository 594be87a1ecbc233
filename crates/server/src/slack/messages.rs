//! Slack message builders for issue intake replies.
//!
//! Provides factory functions for:
//! - Confirmations posted after an event report is stored
//! - Inline slash command responses (logged, usage hint, failures)

use issuedesk_core::IssueReport;
use issuedesk_core::extract::ExtractionError;

use super::types::{Block, Text};

/// Example report text shown in usage hints.
const EXAMPLE_REPORT: &str = "order id: 42 flow: checkout error: payment gateway timeout";

/// Mention a user, or fall back to a neutral greeting target.
fn mention(user: Option<&str>) -> String {
    user.map_or_else(|| "there".to_string(), |id| format!("<@{id}>"))
}

/// Confirmation text posted to the channel an event report came from.
#[must_use]
pub fn logged_message(user: Option<&str>, report: &IssueReport) -> String {
    format!(
        "Hello {}, your issue with Order ID {} has been logged.",
        mention(user),
        report.order_id
    )
}

/// Blocks for the event confirmation: the greeting plus the stored fields.
#[must_use]
pub fn build_logged_message(user: Option<&str>, report: &IssueReport) -> Vec<Block> {
    vec![
        Block::Section {
            text: Text::mrkdwn(logged_message(user, report)),
        },
        Block::Context {
            elements: vec![
                Text::plain(format!("Flow: {}", report.flow)),
                Text::plain(format!("Error: {}", report.error)),
            ],
        },
    ]
}

/// Inline response text after a slash command report is stored.
#[must_use]
pub fn command_logged_text(user: Option<&str>, report: &IssueReport) -> String {
    format!(
        "{} logged an issue for Order ID {} (flow: {}).",
        mention(user),
        report.order_id,
        report.flow
    )
}

/// Hint explaining what a report must contain.
#[must_use]
pub fn usage_hint(command: &str, error: &ExtractionError) -> String {
    format!("Could not log the issue: {error}.\nUsage: `{command} {EXAMPLE_REPORT}`")
}

/// Response when the request signature does not check out.
#[must_use]
pub const fn verification_failed_text() -> &'static str {
    "This request could not be verified, so nothing was logged."
}

/// Response when the report could not be stored.
#[must_use]
pub fn storage_failed_text(report: &IssueReport) -> String {
    format!(
        "Your issue with Order ID {} could not be saved. Please try again shortly.",
        report.order_id
    )
}

/// Response to a slash command this service does not handle.
#[must_use]
pub fn unsupported_command_text(command: &str) -> String {
    format!("`{command}` is not handled here.")
}
