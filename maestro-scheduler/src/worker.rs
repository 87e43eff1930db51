//! A worker owns one `OperatorHandle` and runs it exactly once (4.E).

use maestro_core::error::OperatorError;
use maestro_core::operator::OperatorHandle;
use maestro_core::value::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

/// The observable signals a worker exposes. `standby` is optional and
/// caller-controlled; [`crate::WorkerGroup`] always pre-sets it, so a
/// worker spawned through the scheduler never blocks on it.
#[derive(Clone)]
pub struct WorkerSignals {
    /// Gates the start. The worker blocks until this is set.
    pub standby: Arc<AtomicBool>,
    /// `Handle::run` has begun.
    pub started: Arc<AtomicBool>,
    /// `Handle::run` returned, success or failure.
    pub done: Arc<AtomicBool>,
    /// `Handle::run` raised.
    pub error: Arc<AtomicBool>,
}

impl WorkerSignals {
    fn new() -> Self {
        Self {
            standby: Arc::new(AtomicBool::new(true)),
            started: Arc::new(AtomicBool::new(false)),
            done: Arc::new(AtomicBool::new(false)),
            error: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// `start_time_ns`, `end_time_ns`, and the worker's identity, when available.
///
/// A `tokio::spawn`ed task has no OS-level identity the way a subprocess
/// has a PID; `worker_seq` — the sequence number the owning
/// [`crate::WorkerGroup`] assigned at spawn time — is the closest analogue.
#[derive(Debug, Clone)]
pub struct WorkerMetadata {
    /// Nanoseconds since `UNIX_EPOCH` when `run` began.
    pub start_time_ns: u128,
    /// Nanoseconds since `UNIX_EPOCH` when `run` returned.
    pub end_time_ns: u128,
    /// Sequence number assigned by the owning `WorkerGroup` at spawn time.
    pub worker_seq: u64,
}

/// What a worker sends back over its capacity-1 return channel.
pub struct WorkerReturn {
    /// The operator's result, or the error it raised.
    pub value: Result<Value, OperatorError>,
    /// The handle the worker ran, handed back so the scheduler can reuse it
    /// across repeats when `reinitialize_in_repeats` is false.
    pub handle: Box<dyn OperatorHandle>,
    /// Timing and identity metadata.
    pub metadata: WorkerMetadata,
}

fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX_EPOCH")
        .as_nanos()
}

/// Spawn a worker that runs `handle` exactly once against `inputs`.
///
/// Isolation is the `tokio::spawn`ed task boundary: a panic inside
/// `handle.run` cannot unwind into the scheduler's stack, which is the
/// guarantee §4.E asks for ("a crashing operator cannot corrupt scheduler
/// state"). The return value is sent over `return_tx` *before* `done` is
/// set, so a scheduler that observes `done` can always read the channel
/// without blocking (§5's ordering guarantee).
pub(crate) fn spawn(
    worker_seq: u64,
    mut handle: Box<dyn OperatorHandle>,
    inputs: BTreeMap<String, Value>,
    return_tx: oneshot::Sender<WorkerReturn>,
    started_tx: oneshot::Sender<()>,
    notify: Arc<Notify>,
) -> (WorkerSignals, JoinHandle<()>) {
    let signals = WorkerSignals::new();
    let task_signals = signals.clone();

    let join = tokio::spawn(async move {
        while !task_signals.standby.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        task_signals.started.store(true, Ordering::SeqCst);
        let _ = started_tx.send(());

        let start_time_ns = now_ns();
        let result = handle.run(inputs).await;
        let end_time_ns = now_ns();

        if result.is_err() {
            task_signals.error.store(true, Ordering::SeqCst);
        }

        let metadata = WorkerMetadata {
            start_time_ns,
            end_time_ns,
            worker_seq,
        };
        let _ = return_tx.send(WorkerReturn {
            value: result,
            handle,
            metadata,
        });

        task_signals.done.store(true, Ordering::SeqCst);
        notify.notify_one();
    });

    (signals, join)
}
