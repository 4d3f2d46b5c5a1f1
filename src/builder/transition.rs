//! Builders for transitions under construction.

use crate::core::{
    Action, Completion, Guard, MessageAction, MessageGuard, MessageTransition, Path, VertexId,
};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// A completion transition being configured.
///
/// Returned by [`ModelBuilder::completion`](super::ModelBuilder::completion).
/// Unguarded and effect-free unless configured otherwise.
pub struct CompletionDraft {
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    guard: Guard,
    effect: Option<Action>,
}

impl CompletionDraft {
    pub(crate) fn new(source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            guard: Guard::always(),
            effect: None,
        }
    }

    /// Guard the transition with an argument-less predicate.
    pub fn when<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.guard = Guard::new(predicate);
        self
    }

    /// Action run once per traversal, between exit and entry.
    pub fn effect<F>(&mut self, action: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.effect = Some(Arc::new(action));
        self
    }

    pub(crate) fn finish(self, path: Path) -> Completion {
        Completion {
            guard: self.guard,
            effect: self.effect,
            path,
        }
    }
}

/// A message-triggered transition being configured, untyped storage.
pub(crate) struct TransitionDraft {
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    guard: MessageGuard,
    effect: Option<MessageAction>,
}

impl TransitionDraft {
    pub(crate) fn new<M: Any>(source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            guard: MessageGuard::any::<M>(),
            effect: None,
        }
    }

    pub(crate) fn finish(self, path: Path) -> MessageTransition {
        MessageTransition {
            guard: self.guard,
            effect: self.effect,
            path,
        }
    }
}

/// Typed view of a message transition being configured.
///
/// Returned by [`ModelBuilder::on`](super::ModelBuilder::on). Without a
/// guard, every message of type `M` triggers the transition.
pub struct TransitionBuilder<'b, M> {
    draft: &'b mut TransitionDraft,
    _message: PhantomData<fn(&M)>,
}

impl<'b, M: Any> TransitionBuilder<'b, M> {
    pub(crate) fn new(draft: &'b mut TransitionDraft) -> Self {
        Self {
            draft,
            _message: PhantomData,
        }
    }

    /// Guard the transition with a predicate over the message.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.draft.guard = MessageGuard::new(predicate);
        self
    }

    /// Action receiving the message, run once per traversal between exit and
    /// entry.
    pub fn effect<F>(self, action: F) -> Self
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        self.draft.effect = Some(Arc::new(move |message: &dyn Any| {
            if let Some(message) = message.downcast_ref::<M>() {
                action(message);
            }
        }));
        self
    }
}
