//! The immutable, shareable state machine model.

use super::element::{Hierarchy, RegionId, VertexId};
use super::path::Path;
use super::state::VertexKind;
use super::transition::{Completion, MessageTransition};
use crate::runtime::EngineError;

/// A fully built hierarchy of states, pseudo-states and transitions.
///
/// A model is structurally immutable. It carries no per-instance state, so a
/// single model (usually behind an `Arc`) can drive any number of machine
/// instances, each with its own [`ExecutionContext`](crate::ExecutionContext).
/// Models are built with [`ModelBuilder`](crate::ModelBuilder).
#[derive(Debug)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) tree: Hierarchy,
    pub(crate) completions: Vec<Completion>,
    pub(crate) transitions: Vec<MessageTransition>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root composite state.
    pub fn root(&self) -> VertexId {
        VertexId(0)
    }

    /// The region owned by the root state.
    pub fn root_region(&self) -> RegionId {
        RegionId(0)
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.tree.contains(vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.tree.vertices.len()
    }

    pub fn region_count(&self) -> usize {
        self.tree.regions.len()
    }

    pub fn vertex_name(&self, vertex: VertexId) -> Option<&str> {
        self.tree.vertex(vertex).map(|v| v.name.as_str())
    }

    pub fn region_name(&self, region: RegionId) -> Option<&str> {
        self.tree.region(region).map(|r| r.name.as_str())
    }

    pub fn kind(&self, vertex: VertexId) -> Option<VertexKind> {
        self.tree.vertex(vertex).map(|v| v.kind)
    }

    /// The region directly containing `vertex`; `None` for the root.
    pub fn owner(&self, vertex: VertexId) -> Option<RegionId> {
        self.tree.vertex(vertex)?.owner
    }

    /// The composite state directly containing `vertex`; `None` for the root.
    pub fn owner_state(&self, vertex: VertexId) -> Option<VertexId> {
        self.tree.owner_state(vertex)
    }

    /// The region owned by a composite state.
    pub fn region_of(&self, state: VertexId) -> Option<RegionId> {
        self.kind(state)?.region()
    }

    /// The designated entry pseudo-state of a region.
    pub fn initial(&self, region: RegionId) -> Option<VertexId> {
        self.tree.region(region)?.initial
    }

    pub fn vertices_of(&self, region: RegionId) -> &[VertexId] {
        self.tree
            .region(region)
            .map_or(&[], |r| r.vertices.as_slice())
    }

    /// Composite states from the root down to and including the owner of `vertex`.
    pub fn ancestors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.tree.ancestors(vertex)
    }

    /// Compute the traversal path between two vertices of this model.
    ///
    /// Fails when either handle is foreign to this model or when the two
    /// vertices share no ancestor (the root is never a path endpoint).
    pub fn path(&self, source: VertexId, target: VertexId) -> Result<Path, EngineError> {
        for vertex in [source, target] {
            if !self.contains(vertex) {
                return Err(EngineError::UnknownVertex {
                    index: vertex.index(),
                    model: self.name.clone(),
                });
            }
        }
        Path::between(&self.tree, source, target).ok_or_else(|| EngineError::UnrelatedVertices {
            from: self.tree.name(source).to_string(),
            to: self.tree.name(target).to_string(),
        })
    }

    /// Look up the first vertex with the given name.
    pub fn find(&self, name: &str) -> Option<VertexId> {
        self.tree
            .vertices
            .iter()
            .position(|v| v.name == name)
            .map(VertexId)
    }

    /// Completion transitions leaving `vertex`, in registration order.
    pub fn completions_from(&self, vertex: VertexId) -> impl Iterator<Item = &Completion> + '_ {
        self.tree
            .vertex(vertex)
            .map(|v| v.completions.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&index| &self.completions[index])
    }

    /// Message transitions leaving `vertex`, in registration order.
    pub fn transitions_from(
        &self,
        vertex: VertexId,
    ) -> impl Iterator<Item = &MessageTransition> + '_ {
        self.tree
            .vertex(vertex)
            .map(|v| v.transitions.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&index| &self.transitions[index])
    }
}
