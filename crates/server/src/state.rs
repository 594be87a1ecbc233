//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SlackConfig;
use crate::services::IntakeService;
use crate::slack::RequestVerifier;

/// Application state shared across all handlers.
///
/// Collaborators are constructed once (in `main`, or by tests with fakes)
/// and shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    slack: SlackConfig,
    verifier: RequestVerifier,
    intake: IntakeService,
}

impl AppState {
    /// Build the application state.
    #[must_use]
    pub fn new(slack: SlackConfig, intake: IntakeService) -> Self {
        let verifier = RequestVerifier::new(slack.signing_secret.clone(), slack.signature_max_age);

        Self {
            inner: Arc::new(AppStateInner {
                slack,
                verifier,
                intake,
            }),
        }
    }

    /// Slack settings.
    #[must_use]
    pub fn slack(&self) -> &SlackConfig {
        &self.inner.slack
    }

    /// Signed request verifier.
    #[must_use]
    pub fn verifier(&self) -> &RequestVerifier {
        &self.inner.verifier
    }

    /// Intake service.
    #[must_use]
    pub fn intake(&self) -> &IntakeService {
        &self.inner.intake
    }
}
