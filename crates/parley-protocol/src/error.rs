//! Failure kinds surfaced by a single `ask` invocation.

use crate::{RequestId, SessionId};
use std::time::Duration;
use thiserror::Error;

/// Errors returned while asking, answering, or validating a question batch.
///
/// Every variant is local to one request; none of them affect other
/// in-flight requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AskError {
    /// No notification channel is registered for the session.
    #[error("no question channel registered for session {0}")]
    ChannelUnavailable(SessionId),
    /// Nobody answered within the bound.
    #[error("question timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    /// The user dismissed the questions.
    #[error("question was cancelled by the user")]
    Cancelled,
    /// A request id was registered twice.
    #[error("question request {0} is already pending")]
    IdentifierCollision(RequestId),
    /// The batch failed shape validation.
    #[error("invalid question batch: {0}")]
    InvalidBatch(String),
}
