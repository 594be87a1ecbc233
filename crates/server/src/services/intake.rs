//! Intake service turning report text into stored issue reports.
//!
//! The flow for one report:
//! 1. Ask the entity recognizer for labeled spans (failures mean "no spans")
//! 2. Extract the three required fields, all or nothing
//! 3. Store the report keyed by order id
//! 4. Acknowledge in the channel (event reports only)
//!
//! Storing happens before replying, and a failed reply never undoes a stored
//! report. When storing fails no reply is attempted.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use issuedesk_core::extract::{ExtractionError, extract};
use issuedesk_core::{IssueReport, ReportSource};

use crate::db::{IssueStore, RepositoryError};
use crate::services::entities::EntityRecognizer;
use crate::slack::{ChatReplier, messages};

/// Errors that end intake of a report.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The text did not contain every required field.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The report was extracted but could not be stored.
    #[error("failed to store report for order {}: {source}", .report.order_id)]
    Persistence {
        /// The report that was not stored.
        report: Box<IssueReport>,
        /// Store failure.
        source: RepositoryError,
    },
}

/// Intake service wired to its collaborators.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn IssueStore>,
    recognizer: Arc<dyn EntityRecognizer>,
    replier: Arc<dyn ChatReplier>,
}

impl std::fmt::Debug for IntakeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeService").finish_non_exhaustive()
    }
}

impl IntakeService {
    /// Create a new intake service.
    #[must_use]
    pub fn new(
        store: Arc<dyn IssueStore>,
        recognizer: Arc<dyn EntityRecognizer>,
        replier: Arc<dyn ChatReplier>,
    ) -> Self {
        Self {
            store,
            recognizer,
            replier,
        }
    }

    /// The store reports are written to.
    #[must_use]
    pub fn store(&self) -> &dyn IssueStore {
        self.store.as_ref()
    }

    /// Extract and store a report.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Extraction`] when a field is missing, and
    /// [`IntakeError::Persistence`] (carrying the report) when the store
    /// write fails.
    #[instrument(skip(self, text, reporter))]
    pub async fn record(
        &self,
        text: &str,
        source: ReportSource,
        reporter: Option<&str>,
    ) -> Result<IssueReport, IntakeError> {
        let spans = match self.recognizer.recognize(text).await {
            Ok(spans) => spans,
            Err(e) => {
                warn!(error = %e, "Entity recognizer failed, falling back to patterns");
                Vec::new()
            }
        };

        let fields = extract(text, &spans).inspect_err(|e| {
            info!(error = %e, "Report text is missing fields");
        })?;

        let report = IssueReport::new(fields, source, reporter.map(String::from), text, Utc::now());

        if let Err(e) = self.store.put(&report).await {
            // Full record in the log so it can be re-entered by hand
            error!(
                error = %e,
                order_id = %report.order_id,
                record = %serde_json::to_string(&report).unwrap_or_default(),
                "Failed to store issue report"
            );
            return Err(IntakeError::Persistence {
                report: Box::new(report),
                source: e,
            });
        }

        info!(order_id = %report.order_id, flow = %report.flow, "Issue report stored");

        Ok(report)
    }

    /// Post the confirmation for a stored event report.
    ///
    /// Returns whether the confirmation was posted. Failures are logged and
    /// never affect the stored report.
    #[instrument(skip(self, report), fields(order_id = %report.order_id))]
    pub async fn acknowledge(
        &self,
        report: &IssueReport,
        channel: Option<&str>,
        user: Option<&str>,
    ) -> bool {
        let Some(channel) = channel else {
            warn!("Event has no channel, skipping confirmation");
            return false;
        };

        let text = messages::logged_message(user, report);
        let blocks = messages::build_logged_message(user, report);

        match self.replier.reply(channel, &text, blocks).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to post confirmation to Slack");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use issuedesk_core::extract::LabeledSpan;
    use issuedesk_core::{Flow, OrderId};

    use super::*;
    use crate::services::entities::{EntityError, NoopRecognizer};
    use crate::slack::{Block, SlackError};

    #[derive(Default)]
    struct MemoryStore {
        reports: Mutex<Vec<IssueReport>>,
        fail: bool,
    }

    #[async_trait]
    impl IssueStore for MemoryStore {
        async fn put(&self, report: &IssueReport) -> Result<(), RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Unavailable("down".into()));
            }
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }

        async fn get(&self, order_id: &OrderId) -> Result<Option<IssueReport>, RepositoryError> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|r| &r.order_id == order_id)
                .cloned())
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReplier {
        posts: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatReplier for RecordingReplier {
        async fn reply(
            &self,
            channel: &str,
            text: &str,
            _blocks: Vec<Block>,
        ) -> Result<(), SlackError> {
            self.posts
                .lock()
                .unwrap()
                .push((channel.to_string(), text.to_string()));
            if self.fail {
                return Err(SlackError::Api("channel_not_found".into()));
            }
            Ok(())
        }
    }

    struct FixedRecognizer(Vec<LabeledSpan>);

    #[async_trait]
    impl EntityRecognizer for FixedRecognizer {
        async fn recognize(&self, _text: &str) -> Result<Vec<LabeledSpan>, EntityError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl EntityRecognizer for FailingRecognizer {
        async fn recognize(&self, _text: &str) -> Result<Vec<LabeledSpan>, EntityError> {
            Err(EntityError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    fn service(
        store: Arc<MemoryStore>,
        recognizer: Arc<dyn EntityRecognizer>,
        replier: Arc<RecordingReplier>,
    ) -> IntakeService {
        IntakeService::new(store, recognizer, replier)
    }

    const TEXT: &str = "order id: 42 flow: checkout error: timeout";

    #[tokio::test]
    async fn test_record_stores_report() {
        let store = Arc::new(MemoryStore::default());
        let intake = service(
            store.clone(),
            Arc::new(NoopRecognizer),
            Arc::new(RecordingReplier::default()),
        );

        let report = intake
            .record(TEXT, ReportSource::Command, Some("U1"))
            .await
            .unwrap();

        assert_eq!(report.order_id.as_str(), "42");
        assert_eq!(report.original_input, TEXT);
        assert_eq!(report.reporter.as_deref(), Some("U1"));

        let stored = store
            .get(&OrderId::parse("42").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, report);
    }

    #[tokio::test]
    async fn test_record_prefers_recognizer_spans() {
        let store = Arc::new(MemoryStore::default());
        let recognizer = FixedRecognizer(vec![LabeledSpan::new("flow signup", "NOUN")]);
        let intake = service(
            store,
            Arc::new(recognizer),
            Arc::new(RecordingReplier::default()),
        );

        let report = intake
            .record(TEXT, ReportSource::Event, None)
            .await
            .unwrap();
        assert_eq!(report.flow, Flow::Single("signup".into()));
    }

    #[tokio::test]
    async fn test_record_survives_recognizer_failure() {
        let intake = service(
            Arc::new(MemoryStore::default()),
            Arc::new(FailingRecognizer),
            Arc::new(RecordingReplier::default()),
        );

        let report = intake
            .record(TEXT, ReportSource::Event, None)
            .await
            .unwrap();
        assert_eq!(report.flow, Flow::Single("checkout".into()));
    }

    #[tokio::test]
    async fn test_record_missing_fields_stores_nothing() {
        let store = Arc::new(MemoryStore::default());
        let intake = service(
            store.clone(),
            Arc::new(NoopRecognizer),
            Arc::new(RecordingReplier::default()),
        );

        let err = intake
            .record("flow: checkout error: timeout", ReportSource::Event, None)
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::Extraction(_)));
        assert!(store.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_store_failure_carries_report() {
        let store = Arc::new(MemoryStore {
            fail: true,
            ..MemoryStore::default()
        });
        let intake = service(
            store,
            Arc::new(NoopRecognizer),
            Arc::new(RecordingReplier::default()),
        );

        let err = intake
            .record(TEXT, ReportSource::Event, None)
            .await
            .unwrap_err();

        match err {
            IntakeError::Persistence { report, .. } => assert_eq!(report.order_id.as_str(), "42"),
            IntakeError::Extraction(e) => panic!("unexpected extraction error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_acknowledge_posts_to_channel() {
        let replier = Arc::new(RecordingReplier::default());
        let intake = service(
            Arc::new(MemoryStore::default()),
            Arc::new(NoopRecognizer),
            replier.clone(),
        );
        let report = intake
            .record(TEXT, ReportSource::Event, Some("U7"))
            .await
            .unwrap();

        assert!(intake.acknowledge(&report, Some("C1"), Some("U7")).await);

        let posts = replier.posts.lock().unwrap();
        assert_eq!(
            posts.as_slice(),
            &[(
                "C1".to_string(),
                "Hello <@U7>, your issue with Order ID 42 has been logged.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_acknowledge_failure_keeps_report() {
        let store = Arc::new(MemoryStore::default());
        let replier = Arc::new(RecordingReplier {
            fail: true,
            ..RecordingReplier::default()
        });
        let intake = service(store.clone(), Arc::new(NoopRecognizer), replier);
        let report = intake
            .record(TEXT, ReportSource::Event, None)
            .await
            .unwrap();

        assert!(!intake.acknowledge(&report, Some("C1"), None).await);
        assert_eq!(store.reports.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_acknowledge_without_channel_skips_reply() {
        let replier = Arc::new(RecordingReplier::default());
        let intake = service(
            Arc::new(MemoryStore::default()),
            Arc::new(NoopRecognizer),
            replier.clone(),
        );
        let report = intake
            .record(TEXT, ReportSource::Event, None)
            .await
            .unwrap();

        assert!(!intake.acknowledge(&report, None, None).await);
        assert!(replier.posts.lock().unwrap().is_empty());
    }
}
