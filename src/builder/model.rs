//! Builder for constructing models.

use super::error::{BuildError, ModelViolation};
use super::transition::{CompletionDraft, TransitionBuilder, TransitionDraft};
use super::validation::{validate, Draft};
use crate::core::{Hierarchy, Model, Path, PseudoStateKind, RegionId, VertexId, VertexKind};
use std::any::Any;
use stillwater::Validation;
use tracing::{debug, warn};

/// Builder for a [`Model`].
///
/// The builder owns the root composite state from the start. Vertices are
/// added under a parent composite and identified by the returned
/// [`VertexId`]. Structural problems that can only be judged once the whole
/// hierarchy is known (a region without an initial pseudo-state, a final
/// state with an outgoing transition, ...) are collected and reported
/// together by [`build`](Self::build).
///
/// # Example
///
/// ```
/// use statechart::{ModelBuilder, PseudoStateKind};
///
/// struct Go;
///
/// let mut builder = ModelBuilder::new("door");
/// let root = builder.root();
/// let initial = builder.pseudo_state("initial", root, PseudoStateKind::Initial)?;
/// let closed = builder.simple_state("closed", root)?;
/// let open = builder.simple_state("open", root)?;
/// builder.completion(initial, closed);
/// builder.on::<Go>(closed, open);
///
/// let model = builder.build()?;
/// assert_eq!(model.vertex_count(), 4);
/// # Ok::<(), statechart::BuildError>(())
/// ```
pub struct ModelBuilder {
    name: String,
    tree: Hierarchy,
    completions: Vec<CompletionDraft>,
    transitions: Vec<TransitionDraft>,
    violations: Vec<ModelViolation>,
}

impl ModelBuilder {
    /// Start a model whose root composite state is called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut tree = Hierarchy::default();
        let root = tree.add_vertex(&name, None, VertexKind::Simple);
        let region = tree.add_region(&name, root);
        tree.vertices[root.index()].kind = VertexKind::Composite(region);

        Self {
            name,
            tree,
            completions: Vec::new(),
            transitions: Vec::new(),
            violations: Vec::new(),
        }
    }

    pub fn root(&self) -> VertexId {
        VertexId(0)
    }

    fn region_for(&self, parent: VertexId) -> Result<RegionId, BuildError> {
        let node = self
            .tree
            .vertex(parent)
            .ok_or(BuildError::UnknownVertex {
                index: parent.index(),
            })?;
        node.kind.region().ok_or_else(|| BuildError::NotComposite {
            parent: node.name.clone(),
        })
    }

    fn add(
        &mut self,
        name: &str,
        parent: VertexId,
        kind: VertexKind,
    ) -> Result<VertexId, BuildError> {
        let region = self.region_for(parent)?;
        Ok(self.tree.add_vertex(name, Some(region), kind))
    }

    /// Add a leaf state.
    pub fn simple_state(&mut self, name: &str, parent: VertexId) -> Result<VertexId, BuildError> {
        self.add(name, parent, VertexKind::Simple)
    }

    /// Add a final state. Reaching it makes `parent` complete.
    pub fn final_state(&mut self, name: &str, parent: VertexId) -> Result<VertexId, BuildError> {
        self.add(name, parent, VertexKind::Final)
    }

    /// Add a composite state owning a region of its own.
    pub fn composite_state(
        &mut self,
        name: &str,
        parent: VertexId,
    ) -> Result<VertexId, BuildError> {
        let state = self.add(name, parent, VertexKind::Simple)?;
        let region = self.tree.add_region(name, state);
        self.tree.vertices[state.index()].kind = VertexKind::Composite(region);
        Ok(state)
    }

    /// Add a pseudo-state and make it the entry point of `parent`'s region.
    ///
    /// A region has exactly one entry point; a second one is reported as a
    /// [`ModelViolation::DuplicateInitial`] when the model is built.
    pub fn pseudo_state(
        &mut self,
        name: &str,
        parent: VertexId,
        kind: PseudoStateKind,
    ) -> Result<VertexId, BuildError> {
        let vertex = self.add(name, parent, VertexKind::Pseudo(kind))?;
        let region = self.region_for(parent)?;
        let node = &mut self.tree.regions[region.index()];
        match node.initial {
            None => node.initial = Some(vertex),
            Some(_) => self.violations.push(ModelViolation::DuplicateInitial {
                region: node.name.clone(),
                vertex: name.to_string(),
            }),
        }
        Ok(vertex)
    }

    fn behaviour_target(&mut self, vertex: VertexId) -> Option<usize> {
        match self.tree.vertex(vertex) {
            None => {
                self.violations.push(ModelViolation::UnknownVertex {
                    index: vertex.index(),
                });
                None
            }
            Some(node) if !node.kind.is_state() => {
                self.violations.push(ModelViolation::BehaviorOnPseudoState {
                    vertex: node.name.clone(),
                });
                None
            }
            Some(_) => Some(vertex.index()),
        }
    }

    /// Append an action to a state's entry behaviour.
    pub fn on_entry<F>(&mut self, state: VertexId, action: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        if let Some(index) = self.behaviour_target(state) {
            self.tree.vertices[index].entry.push(action);
        }
        self
    }

    /// Append an action to a state's exit behaviour.
    pub fn on_exit<F>(&mut self, state: VertexId, action: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        if let Some(index) = self.behaviour_target(state) {
            self.tree.vertices[index].exit.push(action);
        }
        self
    }

    /// Add a completion transition, taken when `source` is complete.
    ///
    /// Every pseudo-state needs exactly one of these as its default transition.
    pub fn completion(&mut self, source: VertexId, target: VertexId) -> &mut CompletionDraft {
        let index = self.completions.len();
        if let Some(node) = self.tree.vertices.get_mut(source.index()) {
            node.completions.push(index);
        }
        self.completions.push(CompletionDraft::new(source, target));
        &mut self.completions[index]
    }

    /// Add a transition triggered by messages of type `M`.
    pub fn on<M: Any>(&mut self, source: VertexId, target: VertexId) -> TransitionBuilder<'_, M> {
        let index = self.transitions.len();
        if let Some(node) = self.tree.vertices.get_mut(source.index()) {
            node.transitions.push(index);
        }
        self.transitions.push(TransitionDraft::new::<M>(source, target));
        TransitionBuilder::new(&mut self.transitions[index])
    }

    /// Validate the hierarchy and precompute every transition's path.
    pub fn build(self) -> Result<Model, BuildError> {
        let ModelBuilder {
            name,
            tree,
            completions,
            transitions,
            violations,
        } = self;

        let draft = Draft {
            tree: &tree,
            completions: &completions,
            transitions: &transitions,
            recorded: &violations,
        };
        if let Validation::Failure(errors) = validate(&draft) {
            let violations: Vec<ModelViolation> = errors.into_iter().collect();
            warn!(model = %name, violations = violations.len(), "model failed validation");
            return Err(BuildError::InvalidModel(violations));
        }

        let route = |source: VertexId, target: VertexId| {
            Path::between(&tree, source, target).ok_or_else(|| BuildError::UnrelatedVertices {
                from: tree.name(source).to_string(),
                to: tree.name(target).to_string(),
            })
        };
        let completions = completions
            .into_iter()
            .map(|draft| route(draft.source, draft.target).map(|path| draft.finish(path)))
            .collect::<Result<Vec<_>, BuildError>>()?;
        let transitions = transitions
            .into_iter()
            .map(|draft| route(draft.source, draft.target).map(|path| draft.finish(path)))
            .collect::<Result<Vec<_>, BuildError>>()?;

        debug!(
            model = %name,
            vertices = tree.vertices.len(),
            regions = tree.regions.len(),
            completions = completions.len(),
            transitions = transitions.len(),
            "model built"
        );

        Ok(Model {
            name,
            tree,
            completions,
            transitions,
        })
    }
}
