//! Issue Desk server library.
//!
//! Receives Slack events and slash commands, extracts an order id, a flow
//! and an error description from the message, stores the report keyed by
//! order id and acknowledges back in Slack.
//!
//! The binary in `main.rs` wires real collaborators; tests build the same
//! router with in-memory fakes through [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod slack;
pub mod state;

use axum::Router;

use state::AppState;

/// Build the application router with its state.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    routes::routes().with_state(state)
}
