//! Table of outstanding question requests awaiting settlement.

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::Mutex;
use parley_protocol::{AnswerSet, AskError, QuestionBatch, QuestionRequest, RequestId, SessionId};
use std::collections::HashMap;
use tokio::sync::oneshot;

/// Terminal value delivered to the suspended caller.
pub type Settlement = Result<AnswerSet, AskError>;

/// Pending request stored while waiting for an answer.
#[derive(Debug)]
struct PendingRequest {
    sender: oneshot::Sender<Settlement>,
    session_id: SessionId,
    batch: QuestionBatch,
    created_at: DateTime<Utc>,
}

/// Mapping from request id to the continuation of its suspended caller.
///
/// Every removal goes through a single lock-and-remove, so for each id at
/// most one of [`settle`](Self::settle), [`fail`](Self::fail), or
/// [`discard`](Self::discard) ever observes the entry.
#[derive(Debug, Default)]
pub struct PendingRequestTable {
    entries: Mutex<HashMap<RequestId, PendingRequest>>,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request and return the receiver its caller suspends on.
    pub fn register(
        &self,
        request_id: RequestId,
        session_id: SessionId,
        batch: QuestionBatch,
    ) -> Result<oneshot::Receiver<Settlement>, AskError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&request_id) {
            return Err(AskError::IdentifierCollision(request_id));
        }
        let (sender, receiver) = oneshot::channel();
        entries.insert(
            request_id,
            PendingRequest {
                sender,
                session_id,
                batch,
                created_at: Utc::now(),
            },
        );
        debug!(
            "question request registered (request_id={}, session_id={}, pending={})",
            request_id,
            session_id,
            entries.len()
        );
        Ok(receiver)
    }

    /// Deliver answers. Returns false if the request already settled.
    pub fn settle(&self, request_id: RequestId, answers: AnswerSet) -> bool {
        self.complete(request_id, Ok(answers))
    }

    /// Deliver a failure. Returns false if the request already settled.
    pub fn fail(&self, request_id: RequestId, error: AskError) -> bool {
        self.complete(request_id, Err(error))
    }

    /// Drop an entry without notifying the caller.
    pub fn discard(&self, request_id: RequestId) -> bool {
        self.entries.lock().remove(&request_id).is_some()
    }

    fn complete(&self, request_id: RequestId, settlement: Settlement) -> bool {
        // Sent under the lock so a later `discard` that finds nothing can
        // rely on the settlement already being in the receiver.
        let mut entries = self.entries.lock();
        let Some(pending) = entries.remove(&request_id) else {
            return false;
        };
        // The caller may already be gone; the entry is claimed either way.
        let _ = pending.sender.send(settlement);
        true
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.entries.lock().contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot outstanding requests, oldest first.
    pub fn snapshot(&self) -> Vec<QuestionRequest> {
        let mut requests: Vec<_> = self
            .entries
            .lock()
            .iter()
            .map(|(request_id, pending)| QuestionRequest {
                request_id: *request_id,
                session_id: pending.session_id,
                batch: pending.batch.clone(),
                created_at: pending.created_at,
            })
            .collect();
        requests.sort_by_key(|request| request.created_at);
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_protocol::{Question, QuestionOption};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn batch() -> QuestionBatch {
        QuestionBatch::new(vec![Question {
            prompt: "Which language?".to_string(),
            header: "Lang".to_string(),
            options: vec![QuestionOption::new("A", ""), QuestionOption::new("B", "")],
            multi_select: false,
        }])
        .expect("batch")
    }

    #[test]
    fn register_rejects_duplicate_ids() {
        let table = PendingRequestTable::new();
        let id = Uuid::new_v4();
        let _receiver = table.register(id, Uuid::nil(), batch()).expect("register");
        let err = table.register(id, Uuid::nil(), batch()).unwrap_err();
        assert_eq!(err, AskError::IdentifierCollision(id));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn settle_delivers_once() {
        let table = PendingRequestTable::new();
        let id = Uuid::new_v4();
        let receiver = table.register(id, Uuid::nil(), batch()).expect("register");

        let answers: AnswerSet = [("Lang", "A")].into_iter().collect();
        assert!(table.settle(id, answers.clone()));
        assert!(!table.settle(id, AnswerSet::new()));
        assert!(!table.fail(id, AskError::Cancelled));
        assert!(table.is_empty());

        assert_eq!(receiver.await.expect("settled"), Ok(answers));
    }

    #[tokio::test]
    async fn fail_delivers_error_and_blocks_late_answer() {
        let table = PendingRequestTable::new();
        let id = Uuid::new_v4();
        let receiver = table.register(id, Uuid::nil(), batch()).expect("register");

        assert!(table.fail(id, AskError::Cancelled));
        assert!(!table.settle(id, AnswerSet::new()));
        assert_eq!(receiver.await.expect("settled"), Err(AskError::Cancelled));
    }

    #[test]
    fn settle_counts_even_when_caller_dropped() {
        let table = PendingRequestTable::new();
        let id = Uuid::new_v4();
        drop(table.register(id, Uuid::nil(), batch()).expect("register"));
        assert!(table.settle(id, AnswerSet::new()));
        assert!(!table.contains(id));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let table = PendingRequestTable::new();
        let id = Uuid::new_v4();
        assert!(!table.settle(id, AnswerSet::new()));
        assert!(!table.fail(id, AskError::Cancelled));
        assert!(!table.discard(id));
    }

    #[test]
    fn snapshot_lists_outstanding_requests() {
        let table = PendingRequestTable::new();
        let session = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let _a = table.register(first, session, batch()).expect("register");
        let _b = table.register(second, session, batch()).expect("register");
        table.discard(first);

        let snapshot = table.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].request_id, second);
        assert_eq!(snapshot[0].session_id, session);
        assert_eq!(snapshot[0].batch, batch());
    }
}
