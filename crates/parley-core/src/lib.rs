//! Core question rendezvous for Parley.
//!
//! This crate owns the pending request table, per-request timeouts, the
//! per-session notification registry, and the coordinator that ties them
//! together for agents asking humans questions.

pub mod channel;
pub mod coordinator;
pub mod pending;
pub mod timeout;
pub mod tool;

pub use channel::{ChannelRegistry, QueueChannel};
pub use coordinator::{DEFAULT_QUESTION_TIMEOUT, QuestionCoordinator};
pub use pending::{PendingRequestTable, Settlement};
pub use timeout::TimeoutGuard;
pub use tool::{AskUserQuestionTool, Tool, ToolContext, ToolSpec};
