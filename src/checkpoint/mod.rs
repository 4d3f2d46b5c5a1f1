//! Checkpoint and resume functionality for machine instances.
//!
//! A model is code (guards and behaviours are closures) and is never
//! serialized. What survives a process restart is the instance: which vertex
//! each region last recorded and whether the instance terminated. Restoring a
//! checkpoint checks it against the model it is about to run under.

use crate::core::{Model, RegionId, VertexId};
use crate::runtime::{ExecutionContext, Instance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of one [`Instance`].
///
/// # Example
///
/// ```
/// use statechart::{Checkpoint, Instance, ModelBuilder, PseudoStateKind, StateMachine};
///
/// let mut builder = ModelBuilder::new("m");
/// let root = builder.root();
/// let initial = builder.pseudo_state("initial", root, PseudoStateKind::Initial)?;
/// let idle = builder.simple_state("idle", root)?;
/// builder.completion(initial, idle);
/// let machine = StateMachine::new(builder.build()?);
///
/// let mut instance = Instance::new();
/// machine.initialise(&mut instance)?;
///
/// let json = Checkpoint::capture(machine.model(), &instance).to_json()?;
/// let restored = Checkpoint::from_json(&json)?.restore(machine.model())?;
/// assert_eq!(machine.active_names(&restored), vec!["idle"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the model the instance ran under
    pub model: String,

    /// Identifier of the captured instance
    pub instance: Uuid,

    /// When the captured instance was created
    pub created_at: DateTime<Utc>,

    /// Recorded active vertex per region, ordered by region
    pub active: Vec<(RegionId, VertexId)>,

    pub terminated: bool,
}

impl Checkpoint {
    /// Snapshot an instance running under `model`.
    pub fn capture(model: &Model, instance: &Instance) -> Self {
        let checkpoint = Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            model: model.name().to_string(),
            instance: instance.id(),
            created_at: instance.created_at(),
            active: instance.recorded(),
            terminated: instance.is_terminated(),
        };
        debug!(
            checkpoint = %checkpoint.id,
            model = %checkpoint.model,
            regions = checkpoint.active.len(),
            "checkpoint captured"
        );
        checkpoint
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version == CHECKPOINT_VERSION {
            Ok(())
        } else {
            Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        }
    }

    /// Rebuild the captured instance for `model`.
    ///
    /// Fails if the checkpoint names another model, or if any recorded vertex
    /// is not a member of the region it is recorded for.
    pub fn restore(&self, model: &Model) -> Result<Instance, CheckpointError> {
        self.check_version()?;
        if self.model != model.name() {
            return Err(CheckpointError::ModelMismatch {
                expected: model.name().to_string(),
                found: self.model.clone(),
            });
        }

        for &(region, vertex) in &self.active {
            if model.region_name(region).is_none() {
                return Err(CheckpointError::ValidationFailed(format!(
                    "{} does not exist in model '{}'",
                    region,
                    model.name()
                )));
            }
            if model.owner(vertex) != Some(region) {
                return Err(CheckpointError::ValidationFailed(format!(
                    "{} is not a member of {}",
                    vertex, region
                )));
            }
        }

        debug!(checkpoint = %self.id, instance = %self.instance, "checkpoint restored");
        Ok(Instance::restored(
            self.instance,
            self.created_at,
            self.active.iter().copied().collect(),
            self.terminated,
        ))
    }
}
