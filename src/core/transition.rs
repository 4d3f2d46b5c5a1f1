//! Transitions as stored in a built model.

use super::behavior::{Action, MessageAction};
use super::element::VertexId;
use super::guard::{Guard, MessageGuard};
use super::path::Path;
use std::any::Any;
use std::fmt;

/// Transition taken automatically once its source is complete.
pub struct Completion {
    pub(crate) guard: Guard,
    pub(crate) effect: Option<Action>,
    pub(crate) path: Path,
}

impl Completion {
    pub fn source(&self) -> VertexId {
        self.path.source()
    }

    pub fn target(&self) -> VertexId {
        self.path.target()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.guard.check()
    }

    pub(crate) fn run_effect(&self) {
        if let Some(effect) = &self.effect {
            effect();
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("path", &self.path)
            .field("effect", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}

/// Transition triggered by a message of one particular type.
pub struct MessageTransition {
    pub(crate) guard: MessageGuard,
    pub(crate) effect: Option<MessageAction>,
    pub(crate) path: Path,
}

impl MessageTransition {
    pub fn source(&self) -> VertexId {
        self.path.source()
    }

    pub fn target(&self) -> VertexId {
        self.path.target()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn message_type(&self) -> &'static str {
        self.guard.message_type()
    }

    /// Check if `message` has the accepted type and satisfies the guard.
    pub fn is_enabled(&self, message: &dyn Any) -> bool {
        self.guard.check(message)
    }

    pub(crate) fn run_effect(&self, message: &dyn Any) {
        if let Some(effect) = &self.effect {
            effect(message);
        }
    }
}

impl fmt::Debug for MessageTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageTransition")
            .field("message_type", &self.message_type())
            .field("path", &self.path)
            .field("effect", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}
