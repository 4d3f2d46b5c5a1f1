//! Errors reported while building a model.

use thiserror::Error;

/// Errors that can occur when building a model.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("'{parent}' is not a composite state and cannot own vertices")]
    NotComposite { parent: String },

    #[error("Vertex {index} was not created by this builder")]
    UnknownVertex { index: usize },

    #[error("Model failed validation with {} violation(s)", .0.len())]
    InvalidModel(Vec<ModelViolation>),

    #[error("No common ancestor between '{from}' and '{to}'")]
    UnrelatedVertices { from: String, to: String },
}

/// A single structural rule broken by a model under construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelViolation {
    #[error("Region '{region}' has no initial pseudo-state")]
    MissingInitial { region: String },

    #[error("Region '{region}' already has an initial pseudo-state; '{vertex}' is a second one")]
    DuplicateInitial { region: String, vertex: String },

    #[error("Pseudo-state '{vertex}' has no outgoing completion transition")]
    MissingDefaultTransition { vertex: String },

    #[error("Pseudo-state '{vertex}' has {count} outgoing completion transitions, expected one")]
    MultipleDefaultTransitions { vertex: String, count: usize },

    #[error("Pseudo-state '{vertex}' cannot be the source of a message transition")]
    PseudoStateMessageTransition { vertex: String },

    #[error("Final state '{vertex}' cannot have outgoing transitions")]
    FinalStateTransition { vertex: String },

    #[error("The root state '{root}' cannot be a transition source or target")]
    RootTransition { root: String },

    #[error("Vertex {index} was not created by this builder")]
    UnknownVertex { index: usize },

    #[error("Pseudo-state '{vertex}' cannot have entry or exit behaviour")]
    BehaviorOnPseudoState { vertex: String },
}
