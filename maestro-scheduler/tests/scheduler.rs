use maestro_core::config::{OperatorConfig, RunAfter, SharedInputParams};
use maestro_core::error::SchedulerError;
use maestro_core::state::SharedStore;
use maestro_graph::Graph;
use maestro_loader::NativeLoader;
use maestro_scheduler::Scheduler;
use maestro_store::MemoryStore;
use serde_json::{json, Map};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn op(id: &str, run_after: Option<RunAfter>) -> OperatorConfig {
    OperatorConfig {
        id: id.to_string(),
        name: None,
        module_path: format!("test::{id}"),
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

fn build(
    ops: &[OperatorConfig],
) -> (Graph, Arc<MemoryStore>, Arc<NativeLoader>) {
    let graph = Graph::build(ops).unwrap();
    (graph, Arc::new(MemoryStore::new()), Arc::new(NativeLoader::new()))
}

#[tokio::test]
async fn s1_linear_chain_dispatches_and_completes_all() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let ops = vec![op("A", None), op("B", None), op("C", None)];
    let (graph, store, loader) = build(&ops);

    for id in ["A", "B", "C"] {
        let order = Arc::clone(&order);
        let id = id.to_string();
        loader.register_fn(format!("test::{id}"), move |_inputs| {
            order.lock().unwrap().push(id.clone());
            Ok(json!(null))
        });
    }

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    scheduler.run_parallel().await.unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn s2_fan_out_dispatches_b_and_c_after_a() {
    let ops = vec![
        op("A", None),
        op("B", Some(RunAfter::One("A".to_string()))),
        op("C", Some(RunAfter::One("A".to_string()))),
    ];
    let (graph, store, loader) = build(&ops);

    loader.register_fn("test::A", |_| Ok(json!(1)));
    loader.register_fn("test::B", |_| Ok(json!(2)));
    loader.register_fn("test::C", |_| Ok(json!(3)));

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    scheduler.run_parallel().await.unwrap();
}

#[tokio::test]
async fn s3_join_waits_for_both_predecessors() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let ops = vec![
        op("A", None),
        op("B", None),
        op(
            "C",
            Some(RunAfter::Many(vec!["A".to_string(), "B".to_string()])),
        ),
    ];
    let (graph, store, loader) = build(&ops);

    for id in ["A", "B"] {
        let seen = Arc::clone(&seen);
        let id = id.to_string();
        loader.register_fn(format!("test::{id}"), move |_| {
            seen.lock().unwrap().push(id.clone());
            Ok(json!(null))
        });
    }
    loader.register_fn("test::C", {
        let seen = Arc::clone(&seen);
        move |_| {
            let seen = seen.lock().unwrap();
            assert!(seen.contains(&"A".to_string()));
            assert!(seen.contains(&"B".to_string()));
            Ok(json!(null))
        }
    });

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    scheduler.run_parallel().await.unwrap();
}

#[tokio::test]
async fn s4_save_and_read_with_alias_and_dedicated_param() {
    let mut a = op("A", None);
    a.save_output = true;
    a.shared_output_name = Some("x".to_string());

    let mut b = op("B", Some(RunAfter::One("A".to_string())));
    b.shared_input_params = Some(SharedInputParams::One("x AS val".to_string()));
    b.dedicated_input_params = Map::from_iter([("y".to_string(), json!(1))]);

    let ops = vec![a, b];
    let (graph, store, loader) = build(&ops);

    loader.register_fn("test::A", |_| Ok(json!(42)));

    let observed = Arc::new(std::sync::Mutex::new(None));
    loader.register_fn("test::B", {
        let observed = Arc::clone(&observed);
        move |inputs| {
            *observed.lock().unwrap() = Some(inputs);
            Ok(json!(null))
        }
    });

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    scheduler.run_parallel().await.unwrap();

    let inputs = observed.lock().unwrap().clone().unwrap();
    assert_eq!(inputs.get("val"), Some(&json!(42)));
    assert_eq!(inputs.get("y"), Some(&json!(1)));
}

#[tokio::test]
async fn s5_repeat_with_reinitialize_spawns_three_handles() {
    let mut a = op("A", None);
    a.repeat = 3;
    a.reinitialize_in_repeats = true;
    a.save_output = true;

    let ops = vec![a];
    let (graph, store, loader) = build(&ops);

    let instantiations = Arc::new(AtomicUsize::new(0));
    {
        let instantiations = Arc::clone(&instantiations);
        loader.register(
            "test::A",
            move |_params| {
                let n = instantiations.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Box::new(maestro_loader::ClosureHandle::new(move |_inputs| Ok(json!(n))))
                    as Box<dyn maestro_core::operator::OperatorHandle>)
            },
        );
    }

    let scheduler = Scheduler::new(graph, &ops, Arc::clone(&store), loader);
    scheduler.run_parallel().await.unwrap();

    assert_eq!(instantiations.load(Ordering::SeqCst), 3);
    let final_value: Arc<dyn SharedStore> = store;
    assert_eq!(final_value.get("A").await.unwrap(), json!(3));
}

#[tokio::test]
async fn s6_cycle_rejected_before_dispatch() {
    let ops = vec![
        op("A", Some(RunAfter::One("B".to_string()))),
        op("B", Some(RunAfter::One("A".to_string()))),
    ];
    let err = Graph::build(&ops).unwrap_err();
    assert!(matches!(err, maestro_core::error::GraphError::CycleDetected));
}

#[tokio::test]
async fn operator_error_aborts_the_run() {
    let ops = vec![op("A", None)];
    let (graph, store, loader) = build(&ops);

    loader.register_fn("test::A", |_| {
        Err(maestro_core::error::OperatorError::Runtime("boom".to_string()))
    });

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    let err = scheduler.run_parallel().await.unwrap_err();
    assert!(matches!(err, SchedulerError::Aborted(_)));
}

#[tokio::test]
async fn shared_input_init_only_rejects_second_initializer() {
    let mut a = op("A", None);
    a.shared_input_params = Some(SharedInputParams::Init(Map::from_iter([(
        "seed".to_string(),
        json!(1),
    )])));
    a.shared_input_init_only = true;

    let mut b = op("B", Some(RunAfter::One("A".to_string())));
    b.shared_input_params = Some(SharedInputParams::Init(Map::from_iter([(
        "seed".to_string(),
        json!(2),
    )])));
    b.shared_input_init_only = true;

    let ops = vec![a, b];
    let (graph, store, loader) = build(&ops);
    loader.register_fn("test::A", |_| Ok(json!(null)));
    loader.register_fn("test::B", |_| Ok(json!(null)));

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    let err = scheduler.run_parallel().await.unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::OperatorFailed {
            source: maestro_core::error::OperatorError::AlreadyInitialized(_),
            ..
        }
    ));
}

#[tokio::test]
async fn sequential_mode_runs_one_job_at_a_time_in_topological_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let ops = vec![
        op("A", None),
        op("B", Some(RunAfter::One("A".to_string()))),
        op("C", Some(RunAfter::One("B".to_string()))),
    ];
    let (graph, store, loader) = build(&ops);

    for id in ["A", "B", "C"] {
        let order = Arc::clone(&order);
        let id = id.to_string();
        loader.register_fn(format!("test::{id}"), move |_| {
            order.lock().unwrap().push(id.clone());
            Ok(json!(null))
        });
    }

    let scheduler = Scheduler::new(graph, &ops, store, loader);
    scheduler.run_sequential().await.unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
}
