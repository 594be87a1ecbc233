//! The issue report persisted for every successfully parsed message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Flow, OrderId};
use crate::extract::{EXTRACTOR_VERSION, ExtractedFields};

/// Where a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    /// A message posted in a channel (Events API).
    Event,
    /// A slash command invocation.
    Command,
}

impl ReportSource {
    /// Returns the source as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Command => "command",
        }
    }

    /// Parse a stored source value.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "event" => Some(Self::Event),
            "command" => Some(Self::Command),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully extracted issue report.
///
/// Only built from a complete [`ExtractedFields`], so every report carries a
/// non-empty order id, flow and error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReport {
    /// Order the issue was reported for. Store key.
    pub order_id: OrderId,
    /// Flow (or flows) the issue happened in.
    pub flow: Flow,
    /// Free-text error description.
    pub error: String,
    /// Where the report came from.
    pub source: ReportSource,
    /// Slack user id of the reporter, when known.
    pub reporter: Option<String>,
    /// Raw text the fields were extracted from.
    pub original_input: String,
    /// Extraction contract version that produced the fields.
    pub extractor_version: u16,
    /// When the report was received.
    pub reported_at: DateTime<Utc>,
}

impl IssueReport {
    /// Build a report from extracted fields.
    #[must_use]
    pub fn new(
        fields: ExtractedFields,
        source: ReportSource,
        reporter: Option<String>,
        original_input: impl Into<String>,
        reported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: fields.order_id,
            flow: fields.flow,
            error: fields.error,
            source,
            reporter,
            original_input: original_input.into(),
            extractor_version: EXTRACTOR_VERSION,
            reported_at,
        }
    }
}
