//! Presentation-side answer collection for Parley question batches.
//!
//! The state machine walks a user through one question per step and hands
//! the aggregated answers (or a cancellation) to an [`AnswerSubmitter`].
//!
//! [`AnswerSubmitter`]: parley_protocol::AnswerSubmitter

mod command;
mod machine;

pub use command::WizardCommand;
pub use machine::{AnswerStateMachine, Selection, StepState, WizardState};
