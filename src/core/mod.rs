//! Core model types.
//!
//! This module contains the structural side of the engine:
//! - Element handles and the ownership tree
//! - Vertex kinds, guards and behaviours
//! - Least-common-ancestor path computation
//! - The immutable [`Model`] shared by every machine instance
//!
//! Nothing in this module holds per-instance state; that lives in an
//! [`ExecutionContext`](crate::ExecutionContext).

mod behavior;
mod element;
mod guard;
mod model;
mod path;
mod state;
mod transition;

pub use behavior::{Action, Behavior, MessageAction};
pub use element::{RegionId, VertexId};
pub use guard::{Guard, MessageGuard};
pub use model::Model;
pub use path::Path;
pub use state::{PseudoStateKind, VertexKind};
pub use transition::{Completion, MessageTransition};

pub(crate) use element::{Hierarchy, VertexNode};
