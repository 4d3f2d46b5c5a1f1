//! Statechart: a hierarchical state machine engine
//!
//! Models are trees of composite states, each owning a region of vertices.
//! The model is built once, validated, and then shared by any number of
//! machine instances whose configuration lives in an [`ExecutionContext`].
//!
//! # Core Concepts
//!
//! - **Vertices**: simple, final and composite states plus initial and
//!   history pseudo-states
//! - **Paths**: transitions exit up to the least common ancestor of source
//!   and target, then enter down to the target
//! - **Completion**: a composite whose region reaches a final state takes its
//!   completion transition without any message
//! - **History**: shallow and deep history resume the last recorded
//!   configuration of a region
//!
//! # Example
//!
//! ```rust
//! use statechart::{Instance, ModelBuilder, PseudoStateKind, StateMachine};
//!
//! struct Coin;
//! struct Push;
//!
//! let mut builder = ModelBuilder::new("turnstile");
//! let root = builder.root();
//! let initial = builder.pseudo_state("initial", root, PseudoStateKind::Initial)?;
//! let locked = builder.simple_state("locked", root)?;
//! let unlocked = builder.simple_state("unlocked", root)?;
//! builder.completion(initial, locked);
//! builder.on::<Coin>(locked, unlocked);
//! builder.on::<Push>(unlocked, locked);
//!
//! let machine = StateMachine::new(builder.build()?);
//! let mut instance = Instance::new();
//! machine.initialise(&mut instance)?;
//! assert_eq!(machine.active_names(&instance), vec!["locked"]);
//!
//! assert!(machine.process(&mut instance, &Coin)?);
//! assert_eq!(machine.active_names(&instance), vec!["unlocked"]);
//!
//! // Nothing in `unlocked` reacts to a coin.
//! assert!(!machine.process(&mut instance, &Coin)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod runtime;

// Re-export commonly used types
pub use crate::builder::{BuildError, ModelBuilder, ModelViolation};
pub use crate::checkpoint::{Checkpoint, CheckpointError};
pub use crate::core::{Model, Path, PseudoStateKind, RegionId, VertexId, VertexKind};
pub use crate::runtime::{
    EngineConfig, EngineError, ExecutionContext, Instance, Precedence, StateMachine,
};
