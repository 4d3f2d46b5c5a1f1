//! Errors raised while driving a machine instance.

use thiserror::Error;

/// Errors that abort an `initialise` or `process` call.
///
/// Whenever one of these is returned, the instance's recorded configuration
/// has been restored to what it was before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// More than one guard held for the same dispatch.
    ///
    /// Region records are rolled back, but entry and exit behaviours that ran
    /// before the ambiguity was found are not: a caller may have seen an exit
    /// without the matching entry.
    #[error("{enabled} {trigger} transitions from '{state}' are enabled at once")]
    AmbiguousTransition {
        state: String,
        trigger: String,
        enabled: usize,
    },

    #[error("No common ancestor between '{from}' and '{to}'")]
    UnrelatedVertices { from: String, to: String },

    #[error("Region '{region}' has no initial pseudo-state")]
    MissingInitial { region: String },

    #[error("Step limit ({limit}) exceeded; the model likely contains a completion cycle")]
    StepLimitExceeded { limit: usize },

    #[error("Vertex {index} does not belong to model '{model}'")]
    UnknownVertex { index: usize, model: String },
}
