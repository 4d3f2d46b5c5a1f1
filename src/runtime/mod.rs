//! Executing models against per-instance state.
//!
//! This module is the imperative shell around the structural core:
//!
//! - **Execution context**: the per-instance record of active vertices
//! - **Traversal**: the two-phase entry/exit handshake, completion and
//!   message dispatch
//! - **State machine**: the public `initialise` / `process` / `is_complete`
//!   surface, with rollback of failed dispatches
//!
//! Every operation is synchronous and runs to completion on the caller's
//! thread.

mod config;
mod context;
mod error;
mod machine;
mod traversal;

pub use config::{EngineConfig, Precedence};
pub use context::{ExecutionContext, Instance};
pub use error::EngineError;
pub use machine::StateMachine;
