//! Vertex kinds.
//!
//! The set of vertex kinds is closed: the two-phase enter/exit/complete
//! protocol is implemented by matching on [`VertexKind`] rather than through
//! an open trait.

use super::element::RegionId;
use serde::{Deserialize, Serialize};

/// Kind of a pseudo-state.
///
/// A region's designated entry point is always a pseudo-state of one of these
/// kinds. History kinds make re-entry restore the region's previously active
/// vertex; [`PseudoStateKind::DeepHistory`] also applies that rule to every
/// region nested below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PseudoStateKind {
    Initial,
    ShallowHistory,
    DeepHistory,
}

impl PseudoStateKind {
    /// Check if entering through this pseudo-state restores history.
    pub fn is_history(self) -> bool {
        matches!(self, Self::ShallowHistory | Self::DeepHistory)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::ShallowHistory => "ShallowHistory",
            Self::DeepHistory => "DeepHistory",
        }
    }
}

/// What a vertex is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexKind {
    /// Control vertex; never settles, always leaves through its default
    /// completion transition.
    Pseudo(PseudoStateKind),

    /// Leaf state with entry/exit behaviour and transitions.
    Simple,

    /// Terminal leaf state. A composite state whose region is in a final state
    /// is complete.
    Final,

    /// State owning a nested region.
    Composite(RegionId),
}

impl VertexKind {
    /// Check if this vertex is a state (as opposed to a pseudo-state).
    pub fn is_state(self) -> bool {
        !matches!(self, Self::Pseudo(_))
    }

    pub fn is_final(self) -> bool {
        matches!(self, Self::Final)
    }

    pub fn is_composite(self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// The region owned by a composite state.
    pub fn region(self) -> Option<RegionId> {
        match self {
            Self::Composite(region) => Some(region),
            _ => None,
        }
    }

    /// The pseudo-state kind, if this is a pseudo-state.
    pub fn pseudo(self) -> Option<PseudoStateKind> {
        match self {
            Self::Pseudo(kind) => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_kinds_are_identified() {
        assert!(!PseudoStateKind::Initial.is_history());
        assert!(PseudoStateKind::ShallowHistory.is_history());
        assert!(PseudoStateKind::DeepHistory.is_history());
    }

    #[test]
    fn only_pseudo_states_are_not_states() {
        assert!(!VertexKind::Pseudo(PseudoStateKind::Initial).is_state());
        assert!(VertexKind::Simple.is_state());
        assert!(VertexKind::Final.is_state());
        assert!(VertexKind::Composite(RegionId(0)).is_state());
    }

    #[test]
    fn region_is_only_reported_for_composites() {
        assert_eq!(VertexKind::Composite(RegionId(3)).region(), Some(RegionId(3)));
        assert_eq!(VertexKind::Simple.region(), None);
        assert_eq!(VertexKind::Final.region(), None);
    }

    #[test]
    fn pseudo_kind_serializes_correctly() {
        let kind = PseudoStateKind::DeepHistory;
        let json = serde_json::to_string(&kind).unwrap();
        let deserialized: PseudoStateKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, deserialized);
    }
}
