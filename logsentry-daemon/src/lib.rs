//! Logsentry daemon library.
//!
//! Exposes the daemon internals (CLI definition, logging setup, notifier
//! channels, pass orchestration) so integration tests can drive them
//! without spawning the binary.

pub mod cli;
pub mod logging;
pub mod notify;
pub mod orchestrator;

pub use orchestrator::{Orchestrator, PassOutcome};
