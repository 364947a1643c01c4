//! Runtime layer for the event statistics tool.
//!
//! Watches the record input for changes, tracks the pipeline inputs and
//! drives recomputation from a tokio task.

pub mod orchestrator;
pub mod session;
pub mod source;
