//! Shared sink for unhandled errors.
//!
//! Every action failure and transform rejection is reported here in
//! addition to the per-action error signal, so one place can observe
//! everything that went wrong. Reporting is fire-and-forget.

use crate::actor::Actor;
use crate::error::StateError;
use crate::relay::{Relay, relay};
use futures::StreamExt;
use futures_signals::signal::{Signal, SignalExt};

/// A single reported failure.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportedError {
    pub action: &'static str,
    pub error: StateError,
}

/// Fire-and-forget error reporting with an observable log.
///
/// Explicitly constructed and cheap to clone; every clone reports into the
/// same log. Dropping all clones tears the log down.
#[derive(Clone)]
pub struct ErrorSink {
    report_relay: Relay<ReportedError>,
    log: Actor<Vec<ReportedError>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        let (report_relay, mut report_stream) = relay::<ReportedError>();
        let log = Actor::new(Vec::new(), async move |state| {
            while let Some(report) = report_stream.next().await {
                tracing::warn!(action = report.action, error = %report.error, "unhandled error reported");
                state.lock_mut().push(report);
            }
        });
        Self { report_relay, log }
    }

    /// Report a failure. Never blocks and never fails; reports after
    /// teardown are discarded.
    pub fn report(&self, action: &'static str, error: StateError) {
        self.report_relay.send(ReportedError { action, error });
    }

    /// All reports observed so far, oldest first.
    pub fn errors_signal(&self) -> impl Signal<Item = Vec<ReportedError>> + use<> {
        self.log.signal()
    }

    pub fn count_signal(&self) -> impl Signal<Item = usize> + use<> {
        self.log.signal_ref(|errors| errors.len()).dedupe()
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use futures::StreamExt;
    use futures_signals::signal::SignalExt;

    #[tokio::test]
    async fn reports_accumulate_in_order() {
        let sink = ErrorSink::new();

        sink.report("fetch_all", FetchError::new("first").into());
        sink.report("fetch_all", StateError::Transform("second".into()));

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        let errors = sink.errors_signal().to_stream().next().await.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error.message(), "first");
        assert_eq!(errors[1].error.message(), "second");

        let count = sink.count_signal().to_stream().next().await.unwrap();
        assert_eq!(count, 2);
    }
}
