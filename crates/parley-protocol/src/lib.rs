//! Wire protocol types for Parley question requests, answers, and events.

mod error;
mod question;
mod tool;

pub use error::AskError;
pub use question::{
    AnswerSet, BatchLimits, DEFAULT_ANSWER_DELIMITER, OTHER_LABEL, Question, QuestionBatch,
    QuestionOption,
};
pub use tool::ToolError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
pub type SessionId = Uuid;
/// Unique identifier for an outstanding question request.
pub type RequestId = Uuid;

/// A question batch handed to a presentation surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionRequest {
    /// Id the answer or cancellation must be sent back with.
    pub request_id: RequestId,
    /// Session that asked.
    pub session_id: SessionId,
    /// Questions to render.
    pub batch: QuestionBatch,
    /// Timestamp when the request was registered.
    pub created_at: DateTime<Utc>,
}

/// Messages a presentation surface sends back for a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum QuestionReply {
    /// The user submitted answers.
    Answer {
        request_id: RequestId,
        answers: AnswerSet,
    },
    /// The user dismissed the questions.
    Cancel { request_id: RequestId },
}

/// Terminal outcome of a question request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    /// Answers were delivered to the caller.
    Answered,
    /// The user cancelled.
    Cancelled,
    /// The timeout fired first.
    TimedOut,
    /// The asking side went away before settlement.
    Abandoned,
}

/// Wrapper for events emitted by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMsg {
    /// Unique id for the event.
    pub id: Uuid,
    /// Session id associated with the event.
    pub session_id: SessionId,
    /// Timestamp when the event was created.
    pub created_at: DateTime<Utc>,
    /// Event payload content.
    pub payload: EventPayload,
}

impl EventMsg {
    pub fn new(session_id: SessionId, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            created_at: Utc::now(),
            payload,
        }
    }
}

/// Question lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum EventPayload {
    /// A batch was handed to the session's channel.
    QuestionRequested {
        request_id: RequestId,
        batch: QuestionBatch,
    },
    /// A request reached its terminal outcome.
    QuestionResolved {
        request_id: RequestId,
        outcome: QuestionOutcome,
    },
}

/// Sink interface for coordinator events.
pub trait EventSink: Send + Sync {
    /// Emit an event to downstream listeners.
    fn emit(&self, event: EventMsg);
}

/// Hook that delivers a question batch to whatever renders it.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Hand the request to the presentation surface. No acknowledgement
    /// flows back through here; answers arrive via [`AnswerSubmitter`].
    async fn notify(&self, request: QuestionRequest) -> Result<(), AskError>;
}

/// Receiving end for answers and cancellations from the presentation side.
pub trait AnswerSubmitter: Send + Sync {
    /// Settle a request with answers. Returns false if it already settled.
    fn answer(&self, request_id: RequestId, answers: AnswerSet) -> bool;

    /// Settle a request as cancelled. Returns false if it already settled.
    fn cancel(&self, request_id: RequestId) -> bool;

    /// Route a reply message to `answer` or `cancel`.
    fn reply(&self, reply: QuestionReply) -> bool {
        match reply {
            QuestionReply::Answer {
                request_id,
                answers,
            } => self.answer(request_id, answers),
            QuestionReply::Cancel { request_id } => self.cancel(request_id),
        }
    }
}
