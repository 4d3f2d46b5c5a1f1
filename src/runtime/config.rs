//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Which scope gets the first chance to handle a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// A composite state tries its own transitions before delegating to its
    /// active child.
    #[default]
    OuterFirst,

    /// The active child is tried first; the composite's own transitions only
    /// see messages the nested configuration did not handle.
    InnerFirst,
}

/// Settings applied to every dispatch of a [`StateMachine`](crate::StateMachine).
///
/// # Example
///
/// ```rust
/// use statechart::{EngineConfig, Precedence};
///
/// let config = EngineConfig::from_json(r#"{ "precedence": "inner_first", "max_steps": 64 }"#)
///     .unwrap();
///
/// assert_eq!(config.precedence, Precedence::InnerFirst);
/// assert_eq!(config.max_steps, Some(64));
/// assert_eq!(EngineConfig::default().precedence, Precedence::OuterFirst);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub precedence: Precedence,

    /// Upper bound on transitions taken by a single `initialise` or `process`
    /// call. Unbounded when `None`.
    pub max_steps: Option<usize>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn max_steps(mut self, limit: usize) -> Self {
        self.max_steps = Some(limit);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
