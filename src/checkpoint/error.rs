//! Errors raised while saving or restoring an instance.

use thiserror::Error;

/// Errors that can occur while capturing, encoding or restoring a [`Checkpoint`](super::Checkpoint).
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The instance snapshot could not be encoded as JSON or bincode
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The bytes or text are not a readable instance snapshot
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot was written by an incompatible format version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot was taken from an instance of a different model
    #[error("Checkpoint belongs to model '{found}', not '{expected}'")]
    ModelMismatch { expected: String, found: String },

    /// A recorded region or vertex does not fit the model being restored into
    #[error("Recorded configuration does not fit the model: {0}")]
    ValidationFailed(String),
}
