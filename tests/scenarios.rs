//! End-to-end dispatch scenarios.

use statechart::{
    EngineConfig, EngineError, ExecutionContext, Instance, Model, ModelBuilder, Precedence,
    PseudoStateKind, StateMachine, VertexId,
};
use std::sync::{Arc, Mutex};
use std::thread;

struct Go;
struct Leave;
struct Back;

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn note(&self, entry: &str) -> impl Fn() + Send + Sync + 'static {
        let log = self.0.clone();
        let entry = entry.to_string();
        move || log.lock().unwrap().push(entry.clone())
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

fn initial(builder: &mut ModelBuilder, parent: VertexId, target: VertexId) {
    let name = format!("{}.initial", parent.index());
    let pseudo = builder
        .pseudo_state(&name, parent, PseudoStateKind::Initial)
        .unwrap();
    builder.completion(pseudo, target);
}

/// R { Initial -> A, A --Go--> B }
fn siblings() -> Model {
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let a = builder.simple_state("A", root).unwrap();
    let b = builder.simple_state("B", root).unwrap();
    initial(&mut builder, root, a);
    builder.on::<Go>(a, b).when(|_: &Go| true);
    builder.build().unwrap()
}

#[test]
fn message_moves_between_siblings() {
    let machine = StateMachine::new(siblings());
    let model = machine.model();
    let mut instance = Instance::new();

    machine.initialise(&mut instance).unwrap();
    assert_eq!(instance.active(model.root_region()), model.find("A"));

    assert!(machine.process(&mut instance, &Go).unwrap());
    assert_eq!(instance.active(model.root_region()), model.find("B"));
    assert_eq!(machine.active_names(&instance), vec!["B"]);
}

#[test]
fn sibling_paths_exit_and_enter_one_vertex() {
    let model = siblings();
    let a = model.find("A").unwrap();
    let b = model.find("B").unwrap();

    let path = model.path(a, b).unwrap();

    assert_eq!(path.exited(), vec![a]);
    assert_eq!(path.entered(), vec![b]);
}

#[test]
fn unmatched_message_is_not_handled() {
    let machine = StateMachine::new(siblings());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    assert!(!machine.process(&mut instance, &Leave).unwrap());
    assert!(!machine.process(&mut instance, &"Go").unwrap());
    assert_eq!(machine.active_names(&instance), vec!["A"]);
}

#[test]
fn final_state_completes_composite() {
    // R { Initial -> C, C { Initial -> X(final) }, C --completion--> Y }
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let c = builder.composite_state("C", root).unwrap();
    let x = builder.final_state("X", c).unwrap();
    let y = builder.simple_state("Y", root).unwrap();
    initial(&mut builder, root, c);
    initial(&mut builder, c, x);
    builder.completion(c, y).when(|| true);
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();

    machine.initialise(&mut instance).unwrap();

    assert_eq!(machine.active_names(&instance), vec!["Y"]);
    assert!(!machine.is_complete(&instance));
}

#[test]
fn terminated_instance_is_left_untouched() {
    let machine = StateMachine::new(siblings());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();
    instance.terminate();
    let before = instance.recorded();

    assert!(!machine.process(&mut instance, &Go).unwrap());
    assert_eq!(instance.recorded(), before);
    assert!(machine.is_complete(&instance));
}

#[test]
fn ambiguous_message_transition_changes_nothing() {
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let a = builder.simple_state("A", root).unwrap();
    let b = builder.simple_state("B", root).unwrap();
    let c = builder.simple_state("C", root).unwrap();
    initial(&mut builder, root, a);
    builder.on::<Go>(a, b);
    builder.on::<Go>(a, c);
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();
    let before = instance.recorded();

    let result = machine.process(&mut instance, &Go);

    assert!(matches!(
        result,
        Err(EngineError::AmbiguousTransition { ref state, enabled: 2, .. }) if state == "A"
    ));
    assert_eq!(instance.recorded(), before);
}

#[test]
fn ambiguous_completion_rolls_back_the_whole_dispatch() {
    // A --Go--> C, C { Initial -> X(final) }, C has two enabled completions.
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let a = builder.simple_state("A", root).unwrap();
    let c = builder.composite_state("C", root).unwrap();
    let x = builder.final_state("X", c).unwrap();
    let y = builder.simple_state("Y", root).unwrap();
    let z = builder.simple_state("Z", root).unwrap();
    initial(&mut builder, root, a);
    initial(&mut builder, c, x);
    builder.on::<Go>(a, c);
    builder.completion(c, y);
    builder.completion(c, z);
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();
    let before = instance.recorded();

    let result = machine.process(&mut instance, &Go);

    assert!(matches!(
        result,
        Err(EngineError::AmbiguousTransition { ref state, .. }) if state == "C"
    ));
    assert_eq!(instance.recorded(), before);
    assert_eq!(machine.active_names(&instance), vec!["A"]);
}

#[test]
fn failed_initialise_leaves_a_fresh_instance_empty() {
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let a = builder.simple_state("A", root).unwrap();
    let b = builder.simple_state("B", root).unwrap();
    initial(&mut builder, root, a);
    builder.completion(a, b);
    builder.completion(a, a);
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();

    assert!(machine.initialise(&mut instance).is_err());
    assert!(instance.recorded().is_empty());
}

/// R { Initial -> Outer, Outer { <entry> -> Inner, Inner { Initial -> P, P --Go--> Q } },
///     Outer --Leave--> Away, Away --Back--> Outer }
fn remembering(kind: PseudoStateKind) -> StateMachine {
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let outer = builder.composite_state("Outer", root).unwrap();
    let away = builder.simple_state("Away", root).unwrap();
    let inner = builder.composite_state("Inner", outer).unwrap();
    let p = builder.simple_state("P", inner).unwrap();
    let q = builder.simple_state("Q", inner).unwrap();
    initial(&mut builder, root, outer);
    let history = builder.pseudo_state("History", outer, kind).unwrap();
    builder.completion(history, inner);
    initial(&mut builder, inner, p);
    builder.on::<Go>(p, q);
    builder.on::<Leave>(outer, away);
    builder.on::<Back>(away, outer);
    StateMachine::new(builder.build().unwrap())
}

#[test]
fn shallow_history_falls_back_to_default_on_first_entry() {
    let machine = remembering(PseudoStateKind::ShallowHistory);
    let mut instance = Instance::new();

    machine.initialise(&mut instance).unwrap();

    assert_eq!(machine.active_names(&instance), vec!["Outer", "Inner", "P"]);
}

#[test]
fn shallow_history_restores_only_its_own_region() {
    let machine = remembering(PseudoStateKind::ShallowHistory);
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    assert!(machine.process(&mut instance, &Go).unwrap());
    assert!(machine.process(&mut instance, &Leave).unwrap());
    assert_eq!(machine.active_names(&instance), vec!["Away"]);
    assert!(machine.process(&mut instance, &Back).unwrap());

    assert_eq!(machine.active_names(&instance), vec!["Outer", "Inner", "P"]);
}

#[test]
fn deep_history_restores_every_nested_region() {
    let machine = remembering(PseudoStateKind::DeepHistory);
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    assert!(machine.process(&mut instance, &Go).unwrap());
    assert_eq!(machine.active_names(&instance), vec!["Outer", "Inner", "Q"]);
    assert!(machine.process(&mut instance, &Leave).unwrap());
    assert!(machine.process(&mut instance, &Back).unwrap());

    assert_eq!(machine.active_names(&instance), vec!["Outer", "Inner", "Q"]);
}

#[test]
fn behaviours_run_leaf_to_root_on_exit_and_root_to_leaf_on_entry() {
    let log = Log::default();
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let p = builder.composite_state("P", root).unwrap();
    let q = builder.composite_state("Q", p).unwrap();
    let x = builder.simple_state("X", q).unwrap();
    let z = builder.simple_state("Z", root).unwrap();
    initial(&mut builder, root, p);
    initial(&mut builder, p, q);
    initial(&mut builder, q, x);
    for (state, name) in [(p, "P"), (q, "Q"), (x, "X"), (z, "Z")] {
        builder.on_entry(state, log.note(&format!("enter {name}")));
        builder.on_exit(state, log.note(&format!("exit {name}")));
    }
    let effect = log.note("effect");
    builder.on::<Go>(x, z).effect(move |_: &Go| effect());
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();

    machine.initialise(&mut instance).unwrap();
    assert_eq!(log.take(), vec!["enter P", "enter Q", "enter X"]);

    assert!(machine.process(&mut instance, &Go).unwrap());
    assert_eq!(
        log.take(),
        vec!["exit X", "exit Q", "exit P", "effect", "enter Z"]
    );
}

#[test]
fn enter_then_exit_fires_each_behaviour_once() {
    let log = Log::default();
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let a = builder.simple_state("A", root).unwrap();
    let b = builder.simple_state("B", root).unwrap();
    initial(&mut builder, root, a);
    builder.on_entry(b, log.note("enter B"));
    builder.on_exit(b, log.note("exit B"));
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    machine.enter(&mut instance, b, false).unwrap();
    let entered = instance.recorded();
    machine.exit(&mut instance, b).unwrap();

    assert_eq!(log.take(), vec!["enter B", "exit B"]);
    assert_eq!(instance.recorded(), entered);
}

/// R { Initial -> P, P { Initial -> X, X --Go--> Y }, P --Go--> Z }
fn competing(config: EngineConfig) -> StateMachine {
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let p = builder.composite_state("P", root).unwrap();
    let x = builder.simple_state("X", p).unwrap();
    let y = builder.simple_state("Y", p).unwrap();
    let z = builder.simple_state("Z", root).unwrap();
    initial(&mut builder, root, p);
    initial(&mut builder, p, x);
    builder.on::<Go>(x, y);
    builder.on::<Go>(p, z);
    StateMachine::with_config(builder.build().unwrap(), config)
}

#[test]
fn outer_transition_wins_by_default() {
    let machine = competing(EngineConfig::default());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    assert!(machine.process(&mut instance, &Go).unwrap());

    assert_eq!(machine.active_names(&instance), vec!["Z"]);
}

#[test]
fn inner_first_lets_the_nested_state_handle_it() {
    let machine = competing(EngineConfig::new().precedence(Precedence::InnerFirst));
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    assert!(machine.process(&mut instance, &Go).unwrap());

    assert_eq!(machine.active_names(&instance), vec!["P", "Y"]);
}

#[test]
fn message_into_final_state_settles_through_completion() {
    // R { Initial -> P, P { Initial -> A, A --Go--> Done(final) },
    //     P --completion--> Z, Z --Leave--> End(final) }
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let p = builder.composite_state("P", root).unwrap();
    let a = builder.simple_state("A", p).unwrap();
    let done = builder.final_state("Done", p).unwrap();
    let z = builder.simple_state("Z", root).unwrap();
    let end = builder.final_state("End", root).unwrap();
    initial(&mut builder, root, p);
    initial(&mut builder, p, a);
    builder.on::<Go>(a, done);
    builder.completion(p, z);
    builder.on::<Leave>(z, end);
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();

    assert!(machine.process(&mut instance, &Go).unwrap());
    assert_eq!(machine.active_names(&instance), vec!["Z"]);
    assert!(!machine.is_complete(&instance));

    assert!(machine.process(&mut instance, &Leave).unwrap());
    assert!(machine.is_complete(&instance));
}

/// R { Initial -> A, C { Initial -> K, X(final) }, C --completion--> Z }
/// with A reaching X either by its own completion or by `Go`.
fn final_reached_across_composite(by_message: bool) -> StateMachine {
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let a = builder.simple_state("A", root).unwrap();
    let c = builder.composite_state("C", root).unwrap();
    let k = builder.simple_state("K", c).unwrap();
    let x = builder.final_state("X", c).unwrap();
    let z = builder.simple_state("Z", root).unwrap();
    initial(&mut builder, root, a);
    initial(&mut builder, c, k);
    if by_message {
        builder.on::<Go>(a, x);
    } else {
        builder.completion(a, x);
    }
    builder.completion(c, z);
    StateMachine::new(builder.build().unwrap())
}

#[test]
fn initialise_settles_composite_completed_on_the_way_in() {
    let machine = final_reached_across_composite(false);
    let mut instance = Instance::new();

    machine.initialise(&mut instance).unwrap();

    assert_eq!(machine.active_names(&instance), vec!["Z"]);
}

#[test]
fn completion_and_message_into_a_final_state_agree() {
    let by_completion = final_reached_across_composite(false);
    let by_message = final_reached_across_composite(true);
    let mut first = Instance::new();
    let mut second = Instance::new();

    by_completion.initialise(&mut first).unwrap();
    by_message.initialise(&mut second).unwrap();
    assert_eq!(by_message.active_names(&second), vec!["A"]);
    assert!(by_message.process(&mut second, &Go).unwrap());

    assert_eq!(
        by_completion.active_names(&first),
        by_message.active_names(&second)
    );
}

#[test]
fn explicit_enter_settles_completed_composite() {
    let machine = final_reached_across_composite(false);
    let model = machine.model();
    let a = model.find("A").unwrap();
    let c = model.find("C").unwrap();
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();
    machine.exit(&mut instance, model.find("Z").unwrap()).unwrap();

    machine.enter(&mut instance, c, false).unwrap();
    assert_eq!(machine.active_names(&instance), vec!["C", "K"]);
    assert!(!machine.is_state_complete(&instance, c));

    machine.exit(&mut instance, c).unwrap();
    machine.enter(&mut instance, a, false).unwrap();
    assert_eq!(machine.active_names(&instance), vec!["Z"]);
}

#[test]
fn instance_of_another_model_is_rejected() {
    // R { Initial -> S5, S0 .. S5 } leaves a vertex index the siblings model lacks.
    let mut builder = ModelBuilder::new("wide");
    let root = builder.root();
    let states: Vec<VertexId> = (0..6)
        .map(|i| builder.simple_state(&format!("S{i}"), root).unwrap())
        .collect();
    initial(&mut builder, root, states[5]);
    let wide = StateMachine::new(builder.build().unwrap());
    let narrow = StateMachine::new(siblings());
    let mut instance = Instance::new();
    wide.initialise(&mut instance).unwrap();
    let before = instance.recorded();

    let result = narrow.process(&mut instance, &Go);

    assert!(matches!(
        result,
        Err(EngineError::UnknownVertex { ref model, .. }) if model == "R"
    ));
    assert_eq!(instance.recorded(), before);
}

#[test]
fn ambiguity_keeps_behaviours_that_already_ran() {
    // P --Go--> Q exits P before Q's two completions collide.
    let log = Log::default();
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let p = builder.simple_state("P", root).unwrap();
    let q = builder.simple_state("Q", root).unwrap();
    let y = builder.simple_state("Y", root).unwrap();
    let z = builder.simple_state("Z", root).unwrap();
    initial(&mut builder, root, p);
    builder.on_exit(p, log.note("exit P"));
    builder.on::<Go>(p, q);
    builder.completion(q, y);
    builder.completion(q, z);
    let machine = StateMachine::new(builder.build().unwrap());
    let mut instance = Instance::new();
    machine.initialise(&mut instance).unwrap();
    let before = instance.recorded();

    let result = machine.process(&mut instance, &Go);

    assert!(matches!(result, Err(EngineError::AmbiguousTransition { .. })));
    assert_eq!(instance.recorded(), before);
    assert_eq!(log.take(), vec!["exit P"]);
}

#[test]
fn step_limit_stops_completion_cycles() {
    // P { Initial -> F(final) } completes straight back into itself.
    let mut builder = ModelBuilder::new("R");
    let root = builder.root();
    let p = builder.composite_state("P", root).unwrap();
    let f = builder.final_state("F", p).unwrap();
    initial(&mut builder, root, p);
    initial(&mut builder, p, f);
    builder.completion(p, p);
    let machine = StateMachine::with_config(
        builder.build().unwrap(),
        EngineConfig::new().max_steps(16),
    );
    let mut instance = Instance::new();

    let result = machine.initialise(&mut instance);

    assert_eq!(result, Err(EngineError::StepLimitExceeded { limit: 16 }));
    assert!(instance.recorded().is_empty());
}

#[test]
fn instances_share_one_model_across_threads() {
    let machine = StateMachine::new(siblings());

    let names: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut instance = Instance::new();
                    machine.initialise(&mut instance).unwrap();
                    machine.process(&mut instance, &Go).unwrap();
                    machine
                        .active_names(&instance)
                        .into_iter()
                        .map(str::to_string)
                        .collect::<Vec<String>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(names.iter().all(|n| n == &vec!["B".to_string()]));
}

#[test]
fn machines_can_share_a_model() {
    let first = StateMachine::new(siblings());
    let second = StateMachine::with_config(
        first.shared_model(),
        EngineConfig::new().precedence(Precedence::InnerFirst),
    );
    let mut instance = Instance::new();

    first.initialise(&mut instance).unwrap();
    assert!(second.process(&mut instance, &Go).unwrap());

    assert_eq!(first.active_names(&instance), vec!["B"]);
}
