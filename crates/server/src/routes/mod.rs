//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Slack
//! POST /api/slack/events       - Events API callbacks and URL verification
//! POST /api/slack/commands     - Slash commands
//! ```
//!
//! Both Slack routes share one handler; the payload decides what happens.

pub mod health;
pub mod slack;

use axum::Router;

use crate::state::AppState;

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(health::router()).merge(slack::router())
}
