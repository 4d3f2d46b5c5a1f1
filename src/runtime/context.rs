//! Per-instance execution state.

use crate::core::{RegionId, VertexId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Mutable record of one running machine instance.
///
/// The engine never stores instance state in the model; everything it needs
/// to remember between calls goes through this trait. Implementations only
/// have to be a map from region to vertex plus a one-way terminated flag.
///
/// A single context must not be driven by two calls at once. Distinct
/// contexts over the same model are independent.
pub trait ExecutionContext {
    /// The vertex currently recorded as active in `region`.
    fn active(&self, region: RegionId) -> Option<VertexId>;

    fn set_active(&mut self, region: RegionId, vertex: VertexId);

    /// Forget the active vertex of `region`. Used to undo a failed dispatch.
    fn clear_active(&mut self, region: RegionId);

    fn is_terminated(&self) -> bool;

    /// Mark the instance terminated. Termination is never cleared.
    fn terminate(&mut self);
}

/// In-memory [`ExecutionContext`].
///
/// # Example
///
/// ```rust
/// use statechart::{ExecutionContext, Instance};
///
/// let mut instance = Instance::new();
/// assert!(!instance.is_terminated());
///
/// instance.terminate();
/// assert!(instance.is_terminated());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    id: Uuid,
    created_at: DateTime<Utc>,
    active: HashMap<RegionId, VertexId>,
    terminated: bool,
}

impl Instance {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            active: HashMap::new(),
            terminated: false,
        }
    }

    pub(crate) fn restored(
        id: Uuid,
        created_at: DateTime<Utc>,
        active: HashMap<RegionId, VertexId>,
        terminated: bool,
    ) -> Self {
        Self {
            id,
            created_at,
            active,
            terminated,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Every recorded (region, vertex) pair, ordered by region.
    pub fn recorded(&self) -> Vec<(RegionId, VertexId)> {
        let mut pairs: Vec<_> = self.active.iter().map(|(r, v)| (*r, *v)).collect();
        pairs.sort();
        pairs
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for Instance {
    fn active(&self, region: RegionId) -> Option<VertexId> {
        self.active.get(&region).copied()
    }

    fn set_active(&mut self, region: RegionId, vertex: VertexId) {
        self.active.insert(region, vertex);
    }

    fn clear_active(&mut self, region: RegionId) {
        self.active.remove(&region);
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }
}

/// Write-ahead undo log over a caller's context.
///
/// Every region write records the previous value, so a failed dispatch can be
/// unwound to the configuration the caller handed in.
pub(crate) struct Journal<'c, C: ExecutionContext + ?Sized> {
    inner: &'c mut C,
    undo: Vec<(RegionId, Option<VertexId>)>,
}

impl<'c, C: ExecutionContext + ?Sized> Journal<'c, C> {
    pub(crate) fn new(inner: &'c mut C) -> Self {
        Self {
            inner,
            undo: Vec::new(),
        }
    }

    pub(crate) fn writes(&self) -> usize {
        self.undo.len()
    }

    /// Restore every region written through this journal, newest first.
    pub(crate) fn rollback(self) {
        let Journal { inner, undo } = self;
        for (region, previous) in undo.into_iter().rev() {
            match previous {
                Some(vertex) => inner.set_active(region, vertex),
                None => inner.clear_active(region),
            }
        }
    }
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for Journal<'_, C> {
    fn active(&self, region: RegionId) -> Option<VertexId> {
        self.inner.active(region)
    }

    fn set_active(&mut self, region: RegionId, vertex: VertexId) {
        self.undo.push((region, self.inner.active(region)));
        self.inner.set_active(region, vertex);
    }

    fn clear_active(&mut self, region: RegionId) {
        self.undo.push((region, self.inner.active(region)));
        self.inner.clear_active(region);
    }

    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    fn terminate(&mut self) {
        self.inner.terminate();
    }
}
