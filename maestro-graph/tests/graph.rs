use maestro_core::config::{OperatorConfig, RunAfter};
use maestro_core::error::GraphError;
use maestro_core::id::OperatorId;
use maestro_graph::Graph;
use serde_json::Map;

fn op(id: &str, run_after: Option<RunAfter>) -> OperatorConfig {
    OperatorConfig {
        id: id.to_string(),
        name: None,
        module_path: "test::noop".to_string(),
        class_name: "Noop".to_string(),
        class_params: serde_json::Value::Null,
        dedicated_input_params: Map::new(),
        shared_input_params: None,
        shared_input_init_only: false,
        save_output: false,
        shared_output_name: None,
        run_after,
        repeat: 1,
        reinitialize_in_repeats: true,
        label: None,
        group: None,
        dedicated_input_variations: serde_json::Value::Null,
    }
}

fn id(s: &str) -> OperatorId {
    OperatorId::new(s)
}

#[test]
fn s1_linear_chain_without_run_after() {
    let ops = vec![op("A", None), op("B", None), op("C", None)];
    let graph = Graph::build(&ops).unwrap();

    assert_eq!(graph.roots(), vec![id("A")]);
    assert_eq!(graph.successors(&id("A")).unwrap(), vec![id("B")]);
    assert_eq!(graph.successors(&id("B")).unwrap(), vec![id("C")]);
    assert!(graph.successors(&id("C")).unwrap().is_empty());

    let order = graph.topological_iter();
    let order: Vec<&str> = order.iter().map(|i| i.as_str()).collect();
    assert_eq!(order, vec!["ROOT", "A", "B", "C"]);
}

#[test]
fn s2_fan_out() {
    let ops = vec![
        op("A", None),
        op("B", Some(RunAfter::One("A".to_string()))),
        op("C", Some(RunAfter::One("A".to_string()))),
    ];
    let graph = Graph::build(&ops).unwrap();

    let mut succ = graph.successors(&id("A")).unwrap();
    succ.sort_by_key(|i| i.0.clone());
    assert_eq!(succ, vec![id("B"), id("C")]);
    assert_eq!(graph.predecessors(&id("B")).unwrap(), vec![id("A")]);
    assert_eq!(graph.predecessors(&id("C")).unwrap(), vec![id("A")]);
}

#[test]
fn s3_join() {
    let ops = vec![
        op("A", None),
        op("B", None),
        op(
            "C",
            Some(RunAfter::Many(vec!["A".to_string(), "B".to_string()])),
        ),
    ];
    let graph = Graph::build(&ops).unwrap();

    let mut preds = graph.predecessors(&id("C")).unwrap();
    preds.sort_by_key(|i| i.0.clone());
    assert_eq!(preds, vec![id("A"), id("B")]);

    // B's default predecessor is A (declaration order), not overridden by
    // C's run_after since run_after only rewires edges into its own node.
    assert_eq!(graph.predecessors(&id("B")).unwrap(), vec![id("A")]);
}

#[test]
fn s6_cycle_rejected() {
    let ops = vec![
        op("A", Some(RunAfter::One("B".to_string()))),
        op("B", Some(RunAfter::One("A".to_string()))),
    ];
    let err = Graph::build(&ops).unwrap_err();
    assert!(matches!(err, GraphError::CycleDetected));
}

#[test]
fn duplicate_id_rejected() {
    let ops = vec![op("A", None), op("A", None)];
    let err = Graph::build(&ops).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateOperatorId(i) if i == "A"));
}

#[test]
fn protected_root_id_rejected() {
    let ops = vec![op("ROOT", None)];
    let err = Graph::build(&ops).unwrap_err();
    assert!(matches!(err, GraphError::ProtectedIdUsed));
}

#[test]
fn unknown_run_after_rejected() {
    let ops = vec![op("A", Some(RunAfter::One("ghost".to_string())))];
    let err = Graph::build(&ops).unwrap_err();
    assert!(matches!(err, GraphError::UnknownRunAfter(i) if i == "ghost"));
}

#[test]
fn root_has_no_run_after_rewired_onto_it() {
    let ops = vec![op("A", None)];
    let graph = Graph::build(&ops).unwrap();
    assert!(graph.predecessors(&OperatorId::root()).unwrap().is_empty());
}

#[test]
fn construction_is_deterministic() {
    let ops = vec![
        op("A", None),
        op("B", Some(RunAfter::One("A".to_string()))),
        op("C", Some(RunAfter::One("A".to_string()))),
    ];

    let g1 = Graph::build(&ops).unwrap();
    let g2 = Graph::build(&ops).unwrap();

    assert_eq!(g1.topological_iter(), g2.topological_iter());
    assert_eq!(
        g1.successors(&id("A")).unwrap(),
        g2.successors(&id("A")).unwrap()
    );
}

#[test]
fn single_operator_no_run_after_is_root_successor() {
    let ops = vec![op("only", None)];
    let graph = Graph::build(&ops).unwrap();
    assert_eq!(graph.roots(), vec![id("only")]);
}
