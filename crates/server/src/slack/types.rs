//! Slack wire types.
//!
//! A subset of Block Kit for outgoing messages, the `chat.postMessage`
//! response, and the inline response body returned to slash commands.
//!
//! See: <https://api.slack.com/block-kit>

use serde::{Deserialize, Serialize};

/// A Slack message with blocks.
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    /// Channel ID to post to.
    pub channel: String,
    /// Message blocks.
    pub blocks: Vec<Block>,
    /// Optional plain text fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Block Kit block types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section block with text.
    Section { text: Text },
    /// Context block with small muted text.
    Context { elements: Vec<Text> },
}

/// Text object types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Plain text (no formatting).
    PlainText { text: String, emoji: bool },
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a plain text object.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    /// Create a markdown text object.
    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from posting a message.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID where message was posted.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique ID).
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Visibility of a slash command response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only the invoking user sees the response.
    Ephemeral,
    /// Everyone in the channel sees the response.
    InChannel,
}

/// Inline response body for a slash command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Who sees the response.
    pub response_type: ResponseType,
    /// Response text (mrkdwn).
    pub text: String,
}

impl CommandResponse {
    /// Response only the invoking user sees.
    #[must_use]
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }

    /// Response posted to the whole channel.
    #[must_use]
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }
}
