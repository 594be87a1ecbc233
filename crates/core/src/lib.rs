//! Issue Desk Core - Shared types and pure logic.
//!
//! This crate provides what every Issue Desk component needs:
//! - `server` - Slack webhook service that records issue reports
//! - `cli` - Command-line tools for migrations, parsing and request signing
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated wrappers for order ids, flows and issue reports
//! - [`extract`] - Field extraction from free-form report text
//! - [`signature`] - `v0` request signing and verification
//! - [`dispatch`] - Inbound payload decoding and classification

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dispatch;
pub mod extract;
pub mod signature;
pub mod types;

pub use types::*;
