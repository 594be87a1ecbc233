//! Slack webhook handler for events and slash commands.
//!
//! Every request is decoded and classified first, then verified where
//! required, and only then handed to intake. Slash commands always get a
//! 200 with an inline response; event callbacks use status codes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{debug, instrument, warn};

use issuedesk_core::ReportSource;
use issuedesk_core::dispatch::{
    EventMessage, IgnoreReason, Inbound, SlashCommand, classify, decode_payload,
};

use crate::error::AppError;
use crate::services::IntakeError;
use crate::slack::{CommandResponse, messages};
use crate::state::AppState;

/// Body returned for acknowledged events.
pub const EVENT_RECEIVED: &str = "Event received";

/// Create Slack webhook routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/slack/events", post(handle_slack))
        .route("/api/slack/commands", post(handle_slack))
}

/// Handle a Slack webhook (event callback, URL verification or slash command).
#[instrument(skip(state, headers, body))]
async fn handle_slack(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let payload =
        decode_payload(&body, content_type).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let inbound = classify(&payload, &state.slack().command);

    // Slash commands are always verified; events and challenges by policy
    if (inbound.is_command() || state.slack().verify_events)
        && let Err(e) = state.verifier().verify_request(&headers, &body)
    {
        warn!(error = %e, "Rejected unverified Slack request");
        if inbound.is_command() {
            return Ok(
                Json(CommandResponse::ephemeral(messages::verification_failed_text()))
                    .into_response(),
            );
        }
        return Err(AppError::Forbidden(e.to_string()));
    }

    match inbound {
        Inbound::Challenge(challenge) => {
            debug!("Answering URL verification challenge");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        Inbound::Event(event) => handle_event(&state, event).await,
        Inbound::Command(command) => Ok(Json(handle_command(&state, command).await).into_response()),
        Inbound::Ignored(IgnoreReason::UnknownCommand(command)) => {
            debug!(command = %command, "Ignoring unhandled slash command");
            Ok(
                Json(CommandResponse::ephemeral(messages::unsupported_command_text(
                    &command,
                )))
                .into_response(),
            )
        }
        Inbound::Ignored(reason) => {
            debug!(reason = ?reason, "Ignoring Slack payload");
            Ok(EVENT_RECEIVED.into_response())
        }
    }
}

/// Record an event report and post the confirmation.
async fn handle_event(state: &AppState, event: EventMessage) -> Result<Response, AppError> {
    let intake = state.intake();

    match intake
        .record(&event.text, ReportSource::Event, event.user.as_deref())
        .await
    {
        Ok(report) => {
            intake
                .acknowledge(&report, event.channel.as_deref(), event.user.as_deref())
                .await;
            Ok(EVENT_RECEIVED.into_response())
        }
        Err(IntakeError::Extraction(e)) => Ok((
            StatusCode::OK,
            Json(json!({
                "error": e.to_string(),
                "usage": messages::usage_hint(&state.slack().command, &e),
            })),
        )
            .into_response()),
        Err(IntakeError::Persistence { source, .. }) => Err(AppError::Database(source)),
    }
}

/// Record a slash command report and build the inline response.
async fn handle_command(state: &AppState, command: SlashCommand) -> CommandResponse {
    match state
        .intake()
        .record(&command.text, ReportSource::Command, command.user_id.as_deref())
        .await
    {
        Ok(report) => CommandResponse::in_channel(messages::command_logged_text(
            command.user_id.as_deref(),
            &report,
        )),
        Err(IntakeError::Extraction(e)) => {
            CommandResponse::ephemeral(messages::usage_hint(&command.command, &e))
        }
        Err(IntakeError::Persistence { report, source }) => {
            sentry::capture_error(&source);
            CommandResponse::ephemeral(messages::storage_failed_text(&report))
        }
    }
}
