//! Rendezvous between an asking agent and the human answering it.

use crate::channel::ChannelRegistry;
use crate::pending::{PendingRequestTable, Settlement};
use crate::timeout::TimeoutGuard;
use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::RwLock;
use parley_config::{ConfigError, QuestionsConfig};
use parley_protocol::{
    AnswerSet, AnswerSubmitter, AskError, BatchLimits, EventMsg, EventPayload, EventSink,
    NotificationChannel, QuestionBatch, QuestionOutcome, QuestionRequest, RequestId, SessionId,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Default bound on how long a question may stay unanswered.
pub const DEFAULT_QUESTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Coordinates question requests from agents with answers from a front-end.
///
/// `ask` suspends until exactly one of `answer`, `cancel`, or the timeout
/// settles the request; whichever comes later is a no-op.
pub struct QuestionCoordinator {
    table: Arc<PendingRequestTable>,
    timers: TimeoutGuard,
    channels: ChannelRegistry,
    limits: BatchLimits,
    timeout: Duration,
    event_sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl Default for QuestionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionCoordinator {
    /// Create a coordinator with its own pending table and default policy.
    pub fn new() -> Self {
        Self::with_table(Arc::new(PendingRequestTable::new()))
    }

    /// Create a coordinator over an injected pending table.
    pub fn with_table(table: Arc<PendingRequestTable>) -> Self {
        Self {
            timers: TimeoutGuard::new(Arc::clone(&table)),
            table,
            channels: ChannelRegistry::new(),
            limits: BatchLimits::default(),
            timeout: DEFAULT_QUESTION_TIMEOUT,
            event_sink: RwLock::new(None),
        }
    }

    /// Create a coordinator using configured limits and timeout.
    ///
    /// Settings built in code are validated here, the same as loaded ones.
    pub fn from_config(config: &QuestionsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new()
            .with_timeout(config.timeout())
            .with_limits(config.limits()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn limits(&self) -> &BatchLimits {
        &self.limits
    }

    /// Attach an event sink for question lifecycle events.
    pub fn set_event_sink(&self, sink: Option<Arc<dyn EventSink>>) {
        *self.event_sink.write() = sink;
    }

    /// Register the notification channel for a session.
    pub fn register_channel(
        &self,
        session_id: SessionId,
        channel: Arc<dyn NotificationChannel>,
    ) -> Option<Arc<dyn NotificationChannel>> {
        self.channels.register(session_id, channel)
    }

    /// Remove a session's channel. Requests already delivered stay pending.
    pub fn unregister_channel(&self, session_id: SessionId) -> Option<Arc<dyn NotificationChannel>> {
        self.channels.unregister(session_id)
    }

    pub fn has_channel(&self, session_id: SessionId) -> bool {
        self.channels.contains(session_id)
    }

    /// Ask a batch of questions on behalf of a session and wait for answers.
    pub async fn ask(
        &self,
        batch: QuestionBatch,
        session_id: SessionId,
    ) -> Result<AnswerSet, AskError> {
        batch.validate(&self.limits)?;

        let request_id = Uuid::new_v4();
        let receiver = self.table.register(request_id, session_id, batch.clone())?;
        let mut teardown = RequestTeardown {
            coordinator: self,
            request_id,
            session_id,
            receiver,
            announced: false,
            reported: false,
        };
        self.timers.arm(request_id, self.timeout);

        let Some(channel) = self.channels.get(session_id) else {
            warn!(
                "question asked without a registered channel (request_id={}, session_id={})",
                request_id, session_id
            );
            return Err(AskError::ChannelUnavailable(session_id));
        };

        let question_count = batch.len();
        channel
            .notify(QuestionRequest {
                request_id,
                session_id,
                batch: batch.clone(),
                created_at: Utc::now(),
            })
            .await?;
        teardown.announced = true;
        info!(
            "question batch delivered (request_id={}, session_id={}, questions={})",
            request_id, session_id, question_count
        );
        self.emit(
            session_id,
            EventPayload::QuestionRequested { request_id, batch },
        );

        let settlement = match (&mut teardown.receiver).await {
            Ok(settlement) => settlement,
            Err(_) => {
                warn!(
                    "question request dropped without settlement (request_id={})",
                    request_id
                );
                Err(AskError::Cancelled)
            }
        };
        self.emit(
            session_id,
            EventPayload::QuestionResolved {
                request_id,
                outcome: outcome_of(&settlement),
            },
        );
        teardown.reported = true;
        settlement
    }

    /// Settle a request with answers. Late or duplicate answers return false.
    pub fn answer(&self, request_id: RequestId, answers: AnswerSet) -> bool {
        if self.table.settle(request_id, answers) {
            self.timers.disarm(request_id);
            info!("question answered (request_id={})", request_id);
            return true;
        }
        debug!(
            "ignoring answer for settled or unknown request (request_id={})",
            request_id
        );
        false
    }

    /// Settle a request as cancelled. Late or duplicate cancels return false.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        if self.table.fail(request_id, AskError::Cancelled) {
            self.timers.disarm(request_id);
            info!("question cancelled (request_id={})", request_id);
            return true;
        }
        debug!(
            "ignoring cancel for settled or unknown request (request_id={})",
            request_id
        );
        false
    }

    /// List outstanding requests, oldest first.
    pub fn list_pending(&self) -> Vec<QuestionRequest> {
        self.table.snapshot()
    }

    pub fn pending_count(&self) -> usize {
        self.table.len()
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.table.contains(request_id)
    }

    /// Whether a timeout is still scheduled for the request.
    pub fn has_timer(&self, request_id: RequestId) -> bool {
        self.timers.is_armed(request_id)
    }

    pub fn armed_timers(&self) -> usize {
        self.timers.armed_count()
    }

    fn emit(&self, session_id: SessionId, payload: EventPayload) {
        let Some(sink) = self.event_sink.read().clone() else {
            return;
        };
        sink.emit(EventMsg::new(session_id, payload));
    }
}

impl AnswerSubmitter for QuestionCoordinator {
    fn answer(&self, request_id: RequestId, answers: AnswerSet) -> bool {
        QuestionCoordinator::answer(self, request_id, answers)
    }

    fn cancel(&self, request_id: RequestId) -> bool {
        QuestionCoordinator::cancel(self, request_id)
    }
}

fn outcome_of(settlement: &Settlement) -> QuestionOutcome {
    match settlement {
        Ok(_) => QuestionOutcome::Answered,
        Err(AskError::Timeout(_)) => QuestionOutcome::TimedOut,
        Err(_) => QuestionOutcome::Cancelled,
    }
}

/// Removes the table entry and timer on every exit from `ask`, including
/// early returns and the caller dropping the future.
///
/// A delivered request always gets exactly one `QuestionResolved`: if `ask`
/// is dropped before reporting, the outcome already sitting in the receiver
/// is reported here, or `Abandoned` when nothing settled it.
struct RequestTeardown<'a> {
    coordinator: &'a QuestionCoordinator,
    request_id: RequestId,
    session_id: SessionId,
    receiver: oneshot::Receiver<Settlement>,
    announced: bool,
    reported: bool,
}

impl Drop for RequestTeardown<'_> {
    fn drop(&mut self) {
        let discarded = self.coordinator.table.discard(self.request_id);
        self.coordinator.timers.disarm(self.request_id);
        if !self.announced || self.reported {
            return;
        }
        let outcome = match self.receiver.try_recv() {
            Ok(settlement) if !discarded => outcome_of(&settlement),
            _ => QuestionOutcome::Abandoned,
        };
        info!(
            "question caller went away (request_id={}, session_id={}, outcome={:?})",
            self.request_id, self.session_id, outcome
        );
        self.coordinator.emit(
            self.session_id,
            EventPayload::QuestionResolved {
                request_id: self.request_id,
                outcome,
            },
        );
    }
}
