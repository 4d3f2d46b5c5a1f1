//! Builder API for model construction.
//!
//! Models are assembled top-down from the root composite state. Vertices are
//! added under a composite parent, transitions are attached between vertex
//! handles, and [`ModelBuilder::build`] validates the whole hierarchy at once:
//!
//! - every region has exactly one entry pseudo-state
//! - every pseudo-state has exactly one default completion transition and no
//!   message transitions
//! - final states have no outgoing transitions
//! - the root is never a transition endpoint
//! - behaviours are attached to states only
//!
//! All violations are accumulated and returned together in
//! [`BuildError::InvalidModel`].

pub mod error;
mod model;
mod transition;
mod validation;

pub use error::{BuildError, ModelViolation};
pub use model::ModelBuilder;
pub use transition::{CompletionDraft, TransitionBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PseudoStateKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Temperature(i32);

    #[test]
    fn typed_guard_sees_the_message() {
        let mut builder = ModelBuilder::new("thermostat");
        let root = builder.root();
        let initial = builder
            .pseudo_state("initial", root, PseudoStateKind::Initial)
            .unwrap();
        let idle = builder.simple_state("idle", root).unwrap();
        let heating = builder.simple_state("heating", root).unwrap();
        builder.completion(initial, idle);
        builder
            .on::<Temperature>(idle, heating)
            .when(|t: &Temperature| t.0 < 18);

        let model = builder.build().unwrap();
        let transition = model.transitions_from(idle).next().unwrap();

        assert!(transition.is_enabled(&Temperature(10)));
        assert!(!transition.is_enabled(&Temperature(21)));
        assert!(!transition.is_enabled(&"not a temperature"));
    }

    #[test]
    fn typed_effect_receives_the_message() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut builder = ModelBuilder::new("thermostat");
        let root = builder.root();
        let initial = builder
            .pseudo_state("initial", root, PseudoStateKind::Initial)
            .unwrap();
        let idle = builder.simple_state("idle", root).unwrap();
        builder.completion(initial, idle);
        let recorder = Arc::clone(&seen);
        builder
            .on::<Temperature>(idle, idle)
            .effect(move |t: &Temperature| recorder.store(t.0 as usize, Ordering::SeqCst));

        let model = builder.build().unwrap();
        let transition = model.transitions_from(idle).next().unwrap();
        transition.run_effect(&Temperature(23));

        assert_eq!(seen.load(Ordering::SeqCst), 23);
    }

    #[test]
    fn guarded_completion_is_disabled_when_predicate_fails() {
        let mut builder = ModelBuilder::new("m");
        let root = builder.root();
        let initial = builder
            .pseudo_state("initial", root, PseudoStateKind::Initial)
            .unwrap();
        let a = builder.simple_state("a", root).unwrap();
        let b = builder.simple_state("b", root).unwrap();
        builder.completion(initial, a);
        builder.completion(a, b).when(|| false);

        let model = builder.build().unwrap();

        assert!(!model.completions_from(a).next().unwrap().is_enabled());
        assert!(model.completions_from(initial).next().unwrap().is_enabled());
    }
}
