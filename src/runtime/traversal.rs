//! The two-phase entry/exit handshake and transition dispatch.
//!
//! A [`Traversal`] lives for one public call (`initialise` or `process`). It
//! owns the journaled context for that call and counts the transitions taken
//! so a configured step bound can stop runaway completion chains.
//!
//! Entry is split into `begin_enter` (register as active, run entry
//! behaviour) and `complete` (resolve what comes next beneath the vertex and
//! attempt completion). Exit is split into `begin_exit` (fully exit the
//! active child of a composite) and `end_exit` (run exit behaviour). Paths
//! call the halves separately for the ancestors they already know about.

use super::config::{EngineConfig, Precedence};
use super::context::{ExecutionContext, Journal};
use super::error::EngineError;
use crate::core::{
    Completion, MessageTransition, Model, Path, PseudoStateKind, RegionId, VertexId, VertexKind,
    VertexNode,
};
use std::any::Any;
use tracing::{debug, trace, warn};

pub(crate) struct Traversal<'a, C: ExecutionContext + ?Sized> {
    model: &'a Model,
    config: &'a EngineConfig,
    ctx: Journal<'a, C>,
    steps: usize,
}

impl<'a, C: ExecutionContext + ?Sized> Traversal<'a, C> {
    pub(crate) fn new(model: &'a Model, config: &'a EngineConfig, ctx: &'a mut C) -> Self {
        Self {
            model,
            config,
            ctx: Journal::new(ctx),
            steps: 0,
        }
    }

    /// Keep every write made during the call; returns the transitions taken.
    pub(crate) fn commit(self) -> usize {
        self.steps
    }

    /// Undo every region write made during the call.
    pub(crate) fn rollback(self) {
        warn!(
            writes = self.ctx.writes(),
            steps = self.steps,
            "dispatch failed, restoring configuration"
        );
        self.ctx.rollback();
    }

    fn name(&self, vertex: VertexId) -> &'a str {
        let model = self.model;
        model.tree.name(vertex)
    }

    /// Resolve a handle, which may have been read back from a context that
    /// was driven by another model.
    fn node(&self, vertex: VertexId) -> Result<&'a VertexNode, EngineError> {
        let model = self.model;
        model
            .tree
            .vertex(vertex)
            .ok_or_else(|| EngineError::UnknownVertex {
                index: vertex.index(),
                model: model.name.clone(),
            })
    }

    fn kind(&self, vertex: VertexId) -> Result<VertexKind, EngineError> {
        self.node(vertex).map(|node| node.kind)
    }

    /// Announce arrival: record the vertex as its region's active vertex, then
    /// run its entry behaviour.
    pub(crate) fn begin_enter(&mut self, vertex: VertexId) -> Result<(), EngineError> {
        let node = self.node(vertex)?;
        trace!(vertex = %node.name, "enter");
        if let Some(region) = node.owner {
            self.ctx.set_active(region, vertex);
        }
        node.entry.invoke();
        Ok(())
    }

    /// Both entry phases.
    pub(crate) fn enter(&mut self, vertex: VertexId, deep_history: bool) -> Result<(), EngineError> {
        self.begin_enter(vertex)?;
        self.complete(vertex, deep_history)
    }

    /// Fully exit a vertex: its active descendants first, then itself.
    pub(crate) fn exit(&mut self, vertex: VertexId) -> Result<(), EngineError> {
        self.begin_exit(vertex)?;
        self.end_exit(vertex)
    }

    fn begin_exit(&mut self, vertex: VertexId) -> Result<(), EngineError> {
        if let VertexKind::Composite(region) = self.kind(vertex)? {
            if let Some(active) = self.ctx.active(region) {
                self.exit(active)?;
            }
        }
        Ok(())
    }

    fn end_exit(&mut self, vertex: VertexId) -> Result<(), EngineError> {
        let node = self.node(vertex)?;
        trace!(vertex = %node.name, "exit");
        node.exit.invoke();
        Ok(())
    }

    /// Second entry phase: descend into a composite's region, then attempt the
    /// vertex's own completion transitions.
    pub(crate) fn complete(&mut self, vertex: VertexId, deep_history: bool) -> Result<(), EngineError> {
        if let VertexKind::Composite(region) = self.kind(vertex)? {
            self.descend(region, deep_history)?;
            // The nested cascade may already have left this state.
            if !self.is_active(vertex)? {
                return Ok(());
            }
        }

        if !self.is_complete(vertex) {
            return Ok(());
        }

        if let Some(completion) = self.select_completion(vertex)? {
            self.traverse_completion(completion, deep_history)?;
        }
        Ok(())
    }

    /// Pick and enter the vertex a region resumes in.
    fn descend(&mut self, region: RegionId, deep_history: bool) -> Result<(), EngineError> {
        let model = self.model;
        let node = &model.tree.regions[region.index()];
        let initial = node.initial.ok_or_else(|| EngineError::MissingInitial {
            region: node.name.clone(),
        })?;
        let entry_kind = self
            .kind(initial)?
            .pseudo()
            .unwrap_or(PseudoStateKind::Initial);

        let resume = if deep_history || entry_kind.is_history() {
            self.ctx.active(region).unwrap_or(initial)
        } else {
            initial
        };
        let deep_history = deep_history || entry_kind == PseudoStateKind::DeepHistory;

        trace!(
            region = %node.name,
            vertex = self.name(resume),
            deep_history,
            "descend"
        );
        self.begin_enter(resume)?;
        self.complete(resume, deep_history)
    }

    /// A vertex is active when its region records it; the root always is.
    fn is_active(&self, vertex: VertexId) -> Result<bool, EngineError> {
        Ok(match self.node(vertex)?.owner {
            Some(region) => self.ctx.active(region) == Some(vertex),
            None => true,
        })
    }

    fn is_complete(&self, vertex: VertexId) -> bool {
        is_complete(self.model, &self.ctx, vertex)
    }

    fn select_completion(&self, vertex: VertexId) -> Result<Option<&'a Completion>, EngineError> {
        let model = self.model;
        let enabled: Vec<&'a Completion> = model
            .completions_from(vertex)
            .filter(|completion| completion.is_enabled())
            .collect();
        self.single(vertex, enabled, || "completion".to_string())
    }

    fn select_transition(
        &self,
        vertex: VertexId,
        message: &dyn Any,
    ) -> Result<Option<&'a MessageTransition>, EngineError> {
        let model = self.model;
        let enabled: Vec<&'a MessageTransition> = model
            .transitions_from(vertex)
            .filter(|transition| transition.is_enabled(message))
            .collect();
        let trigger = enabled
            .first()
            .map(|t| format!("'{}' message", t.message_type()))
            .unwrap_or_default();
        self.single(vertex, enabled, || trigger)
    }

    fn single<T>(
        &self,
        vertex: VertexId,
        mut enabled: Vec<T>,
        trigger: impl FnOnce() -> String,
    ) -> Result<Option<T>, EngineError> {
        match enabled.len() {
            0 => Ok(None),
            1 => Ok(enabled.pop()),
            count => Err(EngineError::AmbiguousTransition {
                state: self.name(vertex).to_string(),
                trigger: trigger(),
                enabled: count,
            }),
        }
    }

    fn step(&mut self) -> Result<(), EngineError> {
        self.steps += 1;
        match self.config.max_steps {
            Some(limit) if self.steps > limit => Err(EngineError::StepLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    fn traverse_completion(
        &mut self,
        completion: &'a Completion,
        deep_history: bool,
    ) -> Result<(), EngineError> {
        self.step()?;
        debug!(
            source = self.name(completion.source()),
            target = self.name(completion.target()),
            "completion transition"
        );
        self.exit_path(completion.path())?;
        completion.run_effect();
        self.enter_path(completion.path(), deep_history)
    }

    fn traverse_message(
        &mut self,
        transition: &'a MessageTransition,
        message: &dyn Any,
    ) -> Result<(), EngineError> {
        self.step()?;
        debug!(
            source = self.name(transition.source()),
            target = self.name(transition.target()),
            message = transition.message_type(),
            "message transition"
        );
        self.exit_path(transition.path())?;
        transition.run_effect(message);
        self.enter_path(transition.path(), false)
    }

    /// Exit the source fully, then only the exit behaviour of each ancestor
    /// on the path; their active child on this path is already gone.
    fn exit_path(&mut self, path: &Path) -> Result<(), EngineError> {
        self.exit(path.source())?;
        for &ancestor in path.exit_list() {
            self.end_exit(ancestor)?;
        }
        Ok(())
    }

    /// Announce each ancestor on the path without letting it resolve its own
    /// child, then enter the target fully.
    fn enter_path(&mut self, path: &Path, deep_history: bool) -> Result<(), EngineError> {
        for &ancestor in path.enter_list() {
            self.begin_enter(ancestor)?;
        }
        self.begin_enter(path.target())?;
        self.complete(path.target(), deep_history)
    }

    /// Offer a message to `vertex` and, for composites, its active nested
    /// configuration.
    pub(crate) fn process(&mut self, vertex: VertexId, message: &dyn Any) -> Result<bool, EngineError> {
        if self.ctx.is_terminated() {
            return Ok(false);
        }

        match self.kind(vertex)? {
            VertexKind::Pseudo(_) => Ok(false),
            VertexKind::Simple | VertexKind::Final => self.process_own(vertex, message),
            VertexKind::Composite(region) => match self.config.precedence {
                Precedence::OuterFirst => {
                    if self.process_own(vertex, message)? {
                        return Ok(true);
                    }
                    self.process_nested(region, message)
                }
                Precedence::InnerFirst => {
                    if self.process_nested(region, message)? {
                        return Ok(true);
                    }
                    self.process_own(vertex, message)
                }
            },
        }
    }

    fn process_own(&mut self, vertex: VertexId, message: &dyn Any) -> Result<bool, EngineError> {
        match self.select_transition(vertex, message)? {
            Some(transition) => {
                self.traverse_message(transition, message)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn process_nested(&mut self, region: RegionId, message: &dyn Any) -> Result<bool, EngineError> {
        match self.ctx.active(region) {
            Some(active) => self.process(active, message),
            None => Ok(false),
        }
    }

    /// Fire completions of the innermost active composite at or below `from`
    /// until none is enabled. Reaching a final state inside a composite,
    /// whether through a message or through an entry path that skipped the
    /// composite's own completion, lets the composite complete. Callers pass
    /// the root, since the transition that got here may have left any state
    /// below it.
    pub(crate) fn settle(&mut self, from: VertexId) -> Result<(), EngineError> {
        loop {
            // A state that was left keeps stale records beneath it.
            if self.ctx.is_terminated() || !self.is_active(from)? {
                return Ok(());
            }

            let model = self.model;
            let innermost = std::iter::once(from)
                .chain(active_configuration(model, &self.ctx, from))
                .filter(|&vertex| model.kind(vertex).is_some_and(VertexKind::is_composite))
                .last();
            let Some(innermost) = innermost else {
                return Ok(());
            };

            if !self.is_complete(innermost) {
                return Ok(());
            }
            match self.select_completion(innermost)? {
                Some(completion) => self.traverse_completion(completion, false)?,
                None => return Ok(()),
            }
        }
    }
}

/// Simple states and pseudo-states are always complete; a composite state
/// is complete once its region's active vertex is a final state, or the
/// instance is terminated. Handles the model does not know are never complete.
pub(crate) fn is_complete<C: ExecutionContext + ?Sized>(
    model: &Model,
    ctx: &C,
    vertex: VertexId,
) -> bool {
    match model.kind(vertex) {
        Some(VertexKind::Composite(region)) => {
            ctx.is_terminated()
                || ctx
                    .active(region)
                    .and_then(|active| model.kind(active))
                    .is_some_and(VertexKind::is_final)
        }
        Some(_) => true,
        None => false,
    }
}

/// Active vertices from `from`'s region down to the innermost active leaf.
pub(crate) fn active_configuration<C: ExecutionContext + ?Sized>(
    model: &Model,
    ctx: &C,
    from: VertexId,
) -> Vec<VertexId> {
    let mut configuration = Vec::new();
    let mut current = from;
    while let Some(VertexKind::Composite(region)) = model.kind(current) {
        match ctx.active(region) {
            Some(active) => {
                configuration.push(active);
                current = active;
            }
            None => break,
        }
    }
    configuration
}
