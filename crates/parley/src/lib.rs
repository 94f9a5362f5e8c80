//! Public SDK surface for Parley.
//!
//! This crate re-exports the building blocks and hosts the line-based
//! terminal front-end used by the `parley` binary.

/// Re-export for convenience.
pub use parley_config as config;
pub use parley_core as core;
/// Re-export for convenience.
pub use parley_protocol as protocol;
pub use parley_wizard as wizard;

pub mod terminal;

#[inline]
/// Initialize logging using env_logger.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
