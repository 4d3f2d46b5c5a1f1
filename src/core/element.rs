//! Element handles and the ownership tree they index into.
//!
//! The hierarchy is stored as an arena: vertices and regions live in flat
//! vectors and refer to each other through copyable handles. Ownership goes
//! upward only (vertex -> owning region -> owning composite state), so the
//! tree can be walked from any element to the root without back-references.

use super::behavior::Behavior;
use super::state::VertexKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a vertex (state or pseudo-state) within a [`Model`](super::Model).
///
/// Handles are plain indices. They are only meaningful for the model that
/// produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub(crate) usize);

impl VertexId {
    /// Position of this vertex in its model's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex#{}", self.0)
    }
}

/// Handle to a region owned by a composite state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub(crate) usize);

impl RegionId {
    /// Position of this region in its model's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) struct VertexNode {
    pub(crate) name: String,
    /// `None` only for the root state.
    pub(crate) owner: Option<RegionId>,
    pub(crate) kind: VertexKind,
    pub(crate) entry: Behavior,
    pub(crate) exit: Behavior,
    /// Indices into the model's completion transitions, in registration order.
    pub(crate) completions: Vec<usize>,
    /// Indices into the model's message transitions, in registration order.
    pub(crate) transitions: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct RegionNode {
    pub(crate) name: String,
    pub(crate) owner: VertexId,
    pub(crate) initial: Option<VertexId>,
    pub(crate) vertices: Vec<VertexId>,
}

#[derive(Debug, Default)]
pub(crate) struct Hierarchy {
    pub(crate) vertices: Vec<VertexNode>,
    pub(crate) regions: Vec<RegionNode>,
}

impl Hierarchy {
    pub(crate) fn vertex(&self, id: VertexId) -> Option<&VertexNode> {
        self.vertices.get(id.0)
    }

    pub(crate) fn region(&self, id: RegionId) -> Option<&RegionNode> {
        self.regions.get(id.0)
    }

    pub(crate) fn contains(&self, id: VertexId) -> bool {
        id.0 < self.vertices.len()
    }

    pub(crate) fn add_vertex(
        &mut self,
        name: &str,
        owner: Option<RegionId>,
        kind: VertexKind,
    ) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(VertexNode {
            name: name.to_string(),
            owner,
            kind,
            entry: Behavior::new(),
            exit: Behavior::new(),
            completions: Vec::new(),
            transitions: Vec::new(),
        });
        if let Some(region) = owner.and_then(|r| self.regions.get_mut(r.0)) {
            region.vertices.push(id);
        }
        id
    }

    pub(crate) fn add_region(&mut self, name: &str, owner: VertexId) -> RegionId {
        let id = RegionId(self.regions.len());
        self.regions.push(RegionNode {
            name: name.to_string(),
            owner,
            initial: None,
            vertices: Vec::new(),
        });
        id
    }

    /// The composite state whose region directly contains `id`.
    pub(crate) fn owner_state(&self, id: VertexId) -> Option<VertexId> {
        let region = self.vertex(id)?.owner?;
        self.region(region).map(|r| r.owner)
    }

    /// Composite states from the root down to and including the owner of `id`.
    ///
    /// Empty for the root and for handles this hierarchy does not contain.
    pub(crate) fn ancestors(&self, id: VertexId) -> Vec<VertexId> {
        let mut chain = Vec::new();
        let mut current = self.owner_state(id);
        while let Some(state) = current {
            chain.push(state);
            current = self.owner_state(state);
        }
        chain.reverse();
        chain
    }

    pub(crate) fn name(&self, id: VertexId) -> &str {
        self.vertex(id).map_or("<unknown>", |v| v.name.as_str())
    }
}
