//! Structural rules checked before a model is built.
//!
//! Every rule runs, and every violation is collected, before the builder
//! reports failure. A model author sees the whole list in one pass instead of
//! fixing one problem per build.

use super::error::ModelViolation;
use super::transition::{CompletionDraft, TransitionDraft};
use crate::core::{Hierarchy, VertexId, VertexKind};
use stillwater::{NonEmptyVec, Validation};

pub(crate) type ModelValidation = Validation<(), NonEmptyVec<ModelViolation>>;

/// Everything the rules look at.
pub(crate) struct Draft<'b> {
    pub(crate) tree: &'b Hierarchy,
    pub(crate) completions: &'b [CompletionDraft],
    pub(crate) transitions: &'b [TransitionDraft],
    /// Violations spotted while the builder was being filled in.
    pub(crate) recorded: &'b [ModelViolation],
}

fn check(violations: Vec<ModelViolation>) -> ModelValidation {
    match NonEmptyVec::from_vec(violations) {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(()),
    }
}

fn combine(checks: Vec<ModelValidation>) -> ModelValidation {
    let mut failures = Vec::new();
    for validation in checks {
        if let Validation::Failure(errors) = validation {
            failures.extend(errors);
        }
    }
    check(failures)
}

/// Run every rule, accumulating ALL violations.
pub(crate) fn validate(draft: &Draft<'_>) -> ModelValidation {
    combine(vec![
        check(draft.recorded.to_vec()),
        endpoints_are_known(draft),
        root_is_not_an_endpoint(draft),
        regions_have_initial(draft.tree),
        pseudo_states_have_one_default(draft.tree),
        pseudo_states_ignore_messages(draft.tree),
        final_states_are_terminal(draft.tree),
    ])
}

fn endpoints<'b>(draft: &Draft<'b>) -> impl Iterator<Item = VertexId> + 'b {
    let completions = draft.completions.iter().flat_map(|c| [c.source, c.target]);
    let transitions = draft.transitions.iter().flat_map(|t| [t.source, t.target]);
    completions.chain(transitions)
}

fn endpoints_are_known(draft: &Draft<'_>) -> ModelValidation {
    let mut unknown: Vec<usize> = endpoints(draft)
        .filter(|&vertex| !draft.tree.contains(vertex))
        .map(VertexId::index)
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    check(
        unknown
            .into_iter()
            .map(|index| ModelViolation::UnknownVertex { index })
            .collect(),
    )
}

fn root_is_not_an_endpoint(draft: &Draft<'_>) -> ModelValidation {
    let root = VertexId(0);
    if endpoints(draft).any(|vertex| vertex == root) {
        check(vec![ModelViolation::RootTransition {
            root: draft.tree.name(root).to_string(),
        }])
    } else {
        Validation::Success(())
    }
}

fn regions_have_initial(tree: &Hierarchy) -> ModelValidation {
    check(
        tree.regions
            .iter()
            .filter(|region| region.initial.is_none())
            .map(|region| ModelViolation::MissingInitial {
                region: region.name.clone(),
            })
            .collect(),
    )
}

fn pseudo_states_have_one_default(tree: &Hierarchy) -> ModelValidation {
    check(
        tree.vertices
            .iter()
            .filter(|vertex| !vertex.kind.is_state())
            .filter_map(|vertex| match vertex.completions.len() {
                1 => None,
                0 => Some(ModelViolation::MissingDefaultTransition {
                    vertex: vertex.name.clone(),
                }),
                count => Some(ModelViolation::MultipleDefaultTransitions {
                    vertex: vertex.name.clone(),
                    count,
                }),
            })
            .collect(),
    )
}

fn pseudo_states_ignore_messages(tree: &Hierarchy) -> ModelValidation {
    check(
        tree.vertices
            .iter()
            .filter(|vertex| !vertex.kind.is_state() && !vertex.transitions.is_empty())
            .map(|vertex| ModelViolation::PseudoStateMessageTransition {
                vertex: vertex.name.clone(),
            })
            .collect(),
    )
}

fn final_states_are_terminal(tree: &Hierarchy) -> ModelValidation {
    check(
        tree.vertices
            .iter()
            .filter(|vertex| vertex.kind == VertexKind::Final)
            .filter(|vertex| !vertex.completions.is_empty() || !vertex.transitions.is_empty())
            .map(|vertex| ModelViolation::FinalStateTransition {
                vertex: vertex.name.clone(),
            })
            .collect(),
    )
}
