//! Test helpers shared across Parley crates.

pub mod batch;
pub mod channel;
pub mod events;
pub mod submitter;

pub use batch::{batch, multi_select, single_select};
pub use channel::{FailingChannel, RecordingChannel};
pub use events::RecordingSink;
pub use submitter::RecordingSubmitter;
