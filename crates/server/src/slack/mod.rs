//! Slack integration for issue intake.
//!
//! This module provides:
//! - [`SlackClient`] for posting confirmations, behind the [`ChatReplier`] seam
//! - [`RequestVerifier`] for signed request verification with a replay window
//! - Block Kit and slash command response types
//! - Message builders for intake replies

mod client;
mod error;
pub mod messages;
mod types;
mod verify;

pub use client::{ChatReplier, SlackClient};
pub use error::SlackError;
pub use types::{Block, CommandResponse, PostMessageResponse, ResponseType, SlackMessage, Text};
pub use verify::RequestVerifier;
