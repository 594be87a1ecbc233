//! Inbound payload decoding and classification.
//!
//! Slack delivers three kinds of payloads to the same service:
//!
//! - URL verification handshakes (`{"challenge": ...}`),
//! - Events API callbacks carrying a message in `event.text`,
//! - slash commands, URL-encoded, carrying the argument in `text`.
//!
//! [`decode_payload`] turns a raw body into JSON and [`classify`] decides what
//! to do with it. Neither performs I/O.

use serde_json::{Map, Value};
use thiserror::Error;

/// Content type of URL-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors decoding a request body.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// Body is not valid URL-encoded form data.
    #[error("invalid form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// Decoded body is not a JSON object.
    #[error("payload must be a JSON object")]
    NotAnObject,
}

/// Decode a request body into a JSON object.
///
/// URL-encoded bodies become an object of string fields. A form whose only
/// field is `payload` is decoded as the JSON it carries. Anything else is
/// parsed as JSON.
///
/// # Errors
///
/// Returns [`PayloadError`] if the body cannot be decoded or is not an object.
pub fn decode_payload(body: &[u8], content_type: Option<&str>) -> Result<Value, PayloadError> {
    let is_form = content_type.is_some_and(|ct| {
        ct.split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
    });

    let value = if is_form {
        decode_form(body)?
    } else {
        serde_json::from_slice(body)?
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(PayloadError::NotAnObject)
    }
}

fn decode_form(body: &[u8]) -> Result<Value, PayloadError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;

    if let [(key, payload)] = pairs.as_slice()
        && key == "payload"
    {
        return Ok(serde_json::from_str(payload)?);
    }

    let fields: Map<String, Value> = pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    Ok(Value::Object(fields))
}

/// A message posted in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMessage {
    /// Message text.
    pub text: String,
    /// Channel the message was posted in.
    pub channel: Option<String>,
    /// User who posted the message.
    pub user: Option<String>,
}

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    /// Command name including the leading slash.
    pub command: String,
    /// Argument text after the command.
    pub text: String,
    /// Invoking user.
    pub user_id: Option<String>,
    /// Channel the command was invoked in.
    pub channel_id: Option<String>,
}

/// Why a payload needs no processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Message posted by a bot (including ourselves).
    BotMessage,
    /// Event without message text (joins, reactions, edits...).
    NoText,
    /// A slash command we do not handle.
    UnknownCommand(String),
    /// Not a payload shape we know.
    Unrecognized,
}

/// What an inbound payload asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// URL verification handshake. Echo the value unchanged.
    Challenge(Value),
    /// Message event to extract a report from.
    Event(EventMessage),
    /// Slash command to extract a report from.
    Command(SlashCommand),
    /// Acknowledge and do nothing.
    Ignored(IgnoreReason),
}

impl Inbound {
    /// Whether the payload was a slash command (handled or not).
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::Command(_) | Self::Ignored(IgnoreReason::UnknownCommand(_))
        )
    }
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(String::from)
}

/// Classify a decoded payload.
///
/// `command_name` is the slash command handled by this service
/// (e.g. `/logerror`).
#[must_use]
pub fn classify(payload: &Value, command_name: &str) -> Inbound {
    if let Some(challenge) = payload.get("challenge") {
        return Inbound::Challenge(challenge.clone());
    }

    if let Some(event) = payload.get("event").filter(|e| e.is_object()) {
        let is_bot = event.get("bot_id").is_some_and(|v| !v.is_null())
            || event.get("subtype").and_then(Value::as_str) == Some("bot_message");
        if is_bot {
            return Inbound::Ignored(IgnoreReason::BotMessage);
        }

        return match string_field(event, "text") {
            Some(text) => Inbound::Event(EventMessage {
                text,
                channel: string_field(event, "channel"),
                user: string_field(event, "user"),
            }),
            None => Inbound::Ignored(IgnoreReason::NoText),
        };
    }

    if let Some(command) = string_field(payload, "command") {
        if command != command_name {
            return Inbound::Ignored(IgnoreReason::UnknownCommand(command));
        }

        return Inbound::Command(SlashCommand {
            command,
            text: string_field(payload, "text").unwrap_or_default(),
            user_id: string_field(payload, "user_id"),
            channel_id: string_field(payload, "channel_id"),
        });
    }

    Inbound::Ignored(IgnoreReason::Unrecognized)
}
