//! State machine driver over a shared model.

use super::config::EngineConfig;
use super::context::ExecutionContext;
use super::error::EngineError;
use super::traversal::{active_configuration, is_complete, Traversal};
use crate::core::{Model, VertexId};
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Executes a [`Model`] against caller-owned execution contexts.
///
/// The machine itself is immutable: every call takes the instance's
/// [`ExecutionContext`] explicitly, so one machine can drive many instances,
/// including from different threads. Each call runs to completion before
/// returning. If a call fails, the instance's recorded configuration is put
/// back to what it was when the call started.
pub struct StateMachine {
    model: Arc<Model>,
    config: EngineConfig,
}

impl StateMachine {
    pub fn new(model: impl Into<Arc<Model>>) -> Self {
        Self::with_config(model, EngineConfig::default())
    }

    pub fn with_config(model: impl Into<Arc<Model>>, config: EngineConfig) -> Self {
        Self {
            model: model.into(),
            config,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Shared handle to the model, for building further machines over it.
    pub fn shared_model(&self) -> Arc<Model> {
        Arc::clone(&self.model)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn check(&self, vertex: VertexId) -> Result<(), EngineError> {
        if self.model.contains(vertex) {
            Ok(())
        } else {
            Err(EngineError::UnknownVertex {
                index: vertex.index(),
                model: self.model.name().to_string(),
            })
        }
    }

    fn dispatch<'a, C, T, F>(
        &'a self,
        ctx: &'a mut C,
        operation: &str,
        run: F,
    ) -> Result<T, EngineError>
    where
        C: ExecutionContext + ?Sized,
        F: FnOnce(&mut Traversal<'a, C>) -> Result<T, EngineError>,
    {
        let mut traversal = Traversal::new(&self.model, &self.config, ctx);
        match run(&mut traversal) {
            Ok(value) => {
                let steps = traversal.commit();
                debug!(model = self.model.name(), operation, steps, "dispatch settled");
                Ok(value)
            }
            Err(err) => {
                debug!(model = self.model.name(), operation, error = %err, "dispatch failed");
                traversal.rollback();
                Err(err)
            }
        }
    }

    /// Enter the root and settle into its initial configuration.
    pub fn initialise<C>(&self, ctx: &mut C) -> Result<(), EngineError>
    where
        C: ExecutionContext + ?Sized,
    {
        self.initialise_state(ctx, self.model.root())
    }

    /// Run `state`'s entry behaviour, then resolve its nested configuration
    /// and completion as if entered without history, and settle any composite
    /// the cascade left complete.
    pub fn initialise_state<C>(&self, ctx: &mut C, state: VertexId) -> Result<(), EngineError>
    where
        C: ExecutionContext + ?Sized,
    {
        self.check(state)?;
        let root = self.model.root();
        self.dispatch(ctx, "initialise", |traversal| {
            traversal.enter(state, false)?;
            traversal.settle(root)
        })
    }

    /// Offer a message to the root's active configuration.
    ///
    /// Returns `Ok(false)` when no transition accepted the message, including
    /// whenever the instance is terminated.
    pub fn process<C>(&self, ctx: &mut C, message: &dyn Any) -> Result<bool, EngineError>
    where
        C: ExecutionContext + ?Sized,
    {
        self.process_state(ctx, self.model.root(), message)
    }

    /// Offer a message to `state` and its active nested configuration.
    pub fn process_state<C>(
        &self,
        ctx: &mut C,
        state: VertexId,
        message: &dyn Any,
    ) -> Result<bool, EngineError>
    where
        C: ExecutionContext + ?Sized,
    {
        self.check(state)?;
        if ctx.is_terminated() {
            debug!(model = self.model.name(), "instance terminated, message ignored");
            return Ok(false);
        }
        let root = self.model.root();
        self.dispatch(ctx, "process", |traversal| {
            let handled = traversal.process(state, message)?;
            if handled {
                traversal.settle(root)?;
            }
            Ok(handled)
        })
    }

    /// Check if the root's region has reached a final state, or the instance
    /// is terminated.
    pub fn is_complete<C>(&self, ctx: &C) -> bool
    where
        C: ExecutionContext + ?Sized,
    {
        self.is_state_complete(ctx, self.model.root())
    }

    /// Simple states and pseudo-states are always complete; a composite state
    /// is complete once its region's active vertex is a final state.
    pub fn is_state_complete<C>(&self, ctx: &C, state: VertexId) -> bool
    where
        C: ExecutionContext + ?Sized,
    {
        is_complete(&self.model, ctx, state)
    }

    /// Both entry phases of a single vertex: register it as active, run its
    /// entry behaviour, then resolve its nested configuration and settle it.
    pub fn enter<C>(
        &self,
        ctx: &mut C,
        vertex: VertexId,
        deep_history: bool,
    ) -> Result<(), EngineError>
    where
        C: ExecutionContext + ?Sized,
    {
        self.check(vertex)?;
        let root = self.model.root();
        self.dispatch(ctx, "enter", |traversal| {
            traversal.enter(vertex, deep_history)?;
            traversal.settle(root)
        })
    }

    /// Fully exit a vertex: its active descendants innermost first, then the
    /// vertex itself. Recorded active vertices are kept for history.
    pub fn exit<C>(&self, ctx: &mut C, vertex: VertexId) -> Result<(), EngineError>
    where
        C: ExecutionContext + ?Sized,
    {
        self.check(vertex)?;
        self.dispatch(ctx, "exit", |traversal| traversal.exit(vertex))
    }

    /// Active vertices from the root region down to the innermost leaf.
    pub fn active_configuration<C>(&self, ctx: &C) -> Vec<VertexId>
    where
        C: ExecutionContext + ?Sized,
    {
        active_configuration(&self.model, ctx, self.model.root())
    }

    /// Names of the active configuration, outermost first.
    pub fn active_names<C>(&self, ctx: &C) -> Vec<&str>
    where
        C: ExecutionContext + ?Sized,
    {
        self.active_configuration(ctx)
            .into_iter()
            .filter_map(|vertex| self.model.vertex_name(vertex))
            .collect()
    }
}
