//! A batch of workers the scheduler dispatches atomically (4.F).

use crate::worker::{self, WorkerReturn, WorkerSignals};
use maestro_core::id::OperatorId;
use maestro_core::operator::OperatorHandle;
use maestro_core::value::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

/// Grace period `terminate_all` waits for a worker to stop on its own
/// before aborting its task.
const TERMINATE_GRACE: Duration = Duration::from_millis(800);

struct PendingWorker {
    id: OperatorId,
    handle: Box<dyn OperatorHandle>,
    inputs: BTreeMap<String, Value>,
}

struct ActiveWorker {
    signals: WorkerSignals,
    return_rx: Option<oneshot::Receiver<WorkerReturn>>,
    received: Option<WorkerReturn>,
    join: JoinHandle<()>,
}

/// A batch of workers the scheduler dispatches as one unit.
///
/// Built in two steps, matching the source's "register then launch" split:
/// [`WorkerGroup::add_config`] queues a worker; [`WorkerGroup::spawn`]
/// starts every queued worker and returns once each has signaled `started`.
pub struct WorkerGroup {
    pending: Vec<PendingWorker>,
    workers: HashMap<OperatorId, ActiveWorker>,
    notify: Arc<Notify>,
    next_seq: u64,
}

impl WorkerGroup {
    /// An empty group with nothing queued yet.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            workers: HashMap::new(),
            notify: Arc::new(Notify::new()),
            next_seq: 0,
        }
    }

    /// Queue a worker. Does not start it; see [`WorkerGroup::spawn`].
    pub fn add_config(
        &mut self,
        id: OperatorId,
        handle: Box<dyn OperatorHandle>,
        inputs: BTreeMap<String, Value>,
    ) {
        self.pending.push(PendingWorker { id, handle, inputs });
    }

    /// Start every queued worker. Returns once each has signaled `started`.
    pub async fn spawn(&mut self) {
        let mut started_rxs = Vec::with_capacity(self.pending.len());
        for pending in self.pending.drain(..) {
            let (return_tx, return_rx) = oneshot::channel();
            let (started_tx, started_rx) = oneshot::channel();
            let seq = self.next_seq;
            self.next_seq += 1;

            let (signals, join) = worker::spawn(
                seq,
                pending.handle,
                pending.inputs,
                return_tx,
                started_tx,
                Arc::clone(&self.notify),
            );

            self.workers.insert(
                pending.id,
                ActiveWorker {
                    signals,
                    return_rx: Some(return_rx),
                    received: None,
                    join,
                },
            );
            started_rxs.push(started_rx);
        }

        for rx in started_rxs {
            let _ = rx.await;
        }
    }

    /// Whether this group has nothing queued or running.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.workers.is_empty()
    }

    /// Whether any worker in the group has raised.
    pub fn any_error(&self) -> bool {
        self.workers
            .values()
            .any(|w| w.signals.error.load(Ordering::SeqCst))
    }

    /// A human-readable aggregate of every errored worker's message.
    pub fn error_messages(&mut self) -> String {
        let errored: Vec<OperatorId> = self
            .workers
            .iter()
            .filter(|(_, w)| w.signals.error.load(Ordering::SeqCst))
            .map(|(id, _)| id.clone())
            .collect();

        let mut messages = Vec::with_capacity(errored.len());
        for id in errored {
            if let Some(ret) = self.take_return(&id) {
                if let Err(e) = &ret.value {
                    messages.push(format!("{id}: {e}"));
                }
            }
        }
        messages.join("; ")
    }

    /// Ids whose `done` signal is set.
    pub fn done_operators(&self) -> HashSet<OperatorId> {
        self.workers
            .iter()
            .filter(|(_, w)| w.signals.done.load(Ordering::SeqCst))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Whether every worker in the group is done.
    pub fn all_done(&self) -> bool {
        !self.workers.is_empty()
            && self
                .workers
                .values()
                .all(|w| w.signals.done.load(Ordering::SeqCst))
    }

    /// Take a finished worker's return value (and handle) out of the group.
    ///
    /// Caches the drained channel so a second call for the same id (e.g.
    /// [`WorkerGroup::error_messages`] followed by the scheduler's harvest
    /// step) doesn't silently return `None`; callers are expected to take
    /// each id's return value exactly once per dispatch.
    pub fn take_return(&mut self, id: &OperatorId) -> Option<WorkerReturn> {
        let worker = self.workers.get_mut(id)?;
        if worker.received.is_none() {
            if let Some(rx) = worker.return_rx.take() {
                worker.received = rx.try_recv().ok();
            }
        }
        worker.received.take()
    }

    /// Wait until some worker's `done` signal transitions — the OR of
    /// "any worker done, any worker error" suspension point in §5.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    /// Signal every active worker to stop, wait a bounded grace period,
    /// abort anything still running, and release resources.
    pub async fn terminate_all(&mut self) {
        let active: Vec<(OperatorId, ActiveWorker)> = self.workers.drain().collect();
        for (_, mut worker) in active {
            worker.signals.done.store(true, Ordering::SeqCst);
            tokio::select! {
                _ = &mut worker.join => {}
                _ = tokio::time::sleep(TERMINATE_GRACE) => {
                    worker.join.abort();
                }
            }
        }
    }
}

impl Default for WorkerGroup {
    fn default() -> Self {
        Self::new()
    }
}
