//! The scheduler: seeds jobs from the graph's roots and recursively
//! dispatches ready jobs in `WorkerGroup` batches until none remain (4.G).

use crate::input::compile_inputs;
use crate::job::Job;
use crate::worker_group::WorkerGroup;
use maestro_core::config::OperatorConfig;
use maestro_core::error::SchedulerError;
use maestro_core::id::OperatorId;
use maestro_core::operator::{OperatorLoader, OperatorSpec};
use maestro_core::state::SharedStore;
use maestro_graph::Graph;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs a built [`Graph`] to completion, dispatching ready operators in
/// [`WorkerGroup`] batches and threading their output through a
/// [`SharedStore`] (4.G).
///
/// State held across recursive calls: `jobs`, `completed`, the graph, the
/// store, and the loader — exactly the state §4.G names.
pub struct Scheduler {
    graph: Graph,
    store: Arc<dyn SharedStore>,
    loader: Arc<dyn OperatorLoader>,
    configs: HashMap<OperatorId, OperatorConfig>,
    jobs: HashMap<OperatorId, Job>,
    completed: HashSet<OperatorId>,
}

impl Scheduler {
    /// Build a scheduler over `graph`. `operators` must be the same slice
    /// that produced `graph` via [`Graph::build`].
    pub fn new(
        graph: Graph,
        operators: &[OperatorConfig],
        store: Arc<dyn SharedStore>,
        loader: Arc<dyn OperatorLoader>,
    ) -> Self {
        let configs = operators
            .iter()
            .map(|op| (OperatorId::new(op.id.clone()), op.clone()))
            .collect();
        Self {
            graph,
            store,
            loader,
            configs,
            jobs: HashMap::new(),
            completed: HashSet::new(),
        }
    }

    /// Run every operator to completion, dispatching all ready jobs in a
    /// parallel `WorkerGroup` each cycle. Returns once `completed` covers
    /// every non-`ROOT` node, or on the first worker error.
    pub async fn run_parallel(mut self) -> Result<(), SchedulerError> {
        self.seed();
        self.recurse().await
    }

    /// Run every operator to completion, one ready job at a time — the
    /// specialization `header.enable_multiprocessing = false` selects.
    ///
    /// Built on the same readiness/completion ledger as the parallel
    /// engine: each cycle dispatches a single-worker group, drains it to
    /// completion, then picks the next ready job in topological order.
    pub async fn run_sequential(mut self) -> Result<(), SchedulerError> {
        self.seed();
        while !self.jobs.is_empty() {
            let Some(id) = self.next_ready_in_order() else {
                break;
            };
            let mut group = WorkerGroup::new();
            self.queue(&id, &mut group).await?;
            group.spawn().await;
            self.drain_group(group).await?;
        }
        Ok(())
    }

    fn seed(&mut self) {
        // ROOT never runs and is vacuously "done" — treating it as completed
        // up front lets `ready()` use one rule (every predecessor is in
        // `completed`) uniformly, including for the user DAG's own sources.
        self.completed.insert(OperatorId::root());
        for id in self.graph.roots() {
            let config = self.configs[&id].clone();
            self.jobs.insert(id, Job::new(config));
        }
    }

    fn ready(&self, id: &OperatorId) -> bool {
        self.graph
            .predecessors(id)
            .map(|preds| preds.iter().all(|p| self.completed.contains(p)))
            .unwrap_or(false)
    }

    fn next_ready_in_order(&self) -> Option<OperatorId> {
        self.graph.topological_iter().into_iter().find(|id| {
            self.jobs
                .get(id)
                .is_some_and(|job| !job.online && self.ready(id))
        })
    }

    fn recurse(&mut self) -> BoxFuture<'_, Result<(), SchedulerError>> {
        Box::pin(async move {
            let ready_ids: Vec<OperatorId> = self
                .jobs
                .iter()
                .filter(|(id, job)| !job.online && self.ready(id))
                .map(|(id, _)| id.clone())
                .collect();

            let mut group = WorkerGroup::new();
            for id in &ready_ids {
                self.queue(id, &mut group).await?;
            }
            group.spawn().await;

            self.drain_group(group).await?;

            if !self.jobs.is_empty() {
                self.recurse().await
            } else {
                Ok(())
            }
        })
    }

    /// Load (or reuse) `id`'s handle, compile its inputs, and queue it on
    /// `group`. Marks the job `online`.
    async fn queue(
        &mut self,
        id: &OperatorId,
        group: &mut WorkerGroup,
    ) -> Result<(), SchedulerError> {
        let job = self.jobs.get_mut(id).expect("queued id is a live job");
        job.online = true;

        let handle = match job.handle.take() {
            Some(h) => h,
            None => {
                let spec = spec_for(&job.config);
                self.loader
                    .load(&spec)
                    .await
                    .map_err(|e| SchedulerError::LoaderFailed {
                        operator_id: id.to_string(),
                        source: e,
                    })?
            }
        };

        let inputs = compile_inputs(&job.config, self.store.as_ref())
            .await
            .map_err(|e| SchedulerError::OperatorFailed {
                operator_id: id.to_string(),
                source: e,
            })?;

        tracing::debug!(operator_id = %id, "dispatching operator");
        group.add_config(id.clone(), handle, inputs);
        Ok(())
    }

    /// Drive `group`'s inner suspension loop to exhaustion: abort on any
    /// error, harvest every worker as it finishes, and keep waiting until
    /// the whole batch is done before handing control back to `recurse`.
    ///
    /// The pseudocode this implements exits as soon as *a* wave of workers
    /// finishes, leaving slower workers in the same batch to be picked up
    /// "later" via a stack of still-active groups. Collapsing that stack
    /// into "drain one group fully, then move on" keeps a single owner for
    /// every worker's join handle and avoids ever leaving one running
    /// unobserved — `self.jobs` would otherwise hold an entry that can
    /// never again reach `completed`.
    async fn drain_group(&mut self, mut group: WorkerGroup) -> Result<(), SchedulerError> {
        if group.is_empty() {
            return Ok(());
        }

        let mut harvested: HashSet<OperatorId> = HashSet::new();

        loop {
            if group.any_error() {
                let messages = group.error_messages();
                tracing::warn!(errors = %messages, "run aborted");
                group.terminate_all().await;
                return Err(SchedulerError::Aborted(messages));
            }

            let newly_done: Vec<OperatorId> = group
                .done_operators()
                .into_iter()
                .filter(|id| self.jobs.contains_key(id) && !harvested.contains(id))
                .collect();

            for id in &newly_done {
                self.harvest(id, &mut group).await?;
                harvested.insert(id.clone());
            }

            if group.all_done() {
                break;
            }

            if newly_done.is_empty() {
                group.notified().await;
            }
        }

        group.terminate_all().await;
        Ok(())
    }

    /// Write `id`'s output (if `save_output`), advance its repeat count,
    /// and either re-arm it for another repeat or mark it `completed` and
    /// enqueue its newly-unblocked successors.
    async fn harvest(
        &mut self,
        id: &OperatorId,
        group: &mut WorkerGroup,
    ) -> Result<(), SchedulerError> {
        let ret = group
            .take_return(id)
            .expect("id was reported done by this group");

        let value = ret
            .value
            .map_err(|e| SchedulerError::OperatorFailed {
                operator_id: id.to_string(),
                source: e,
            })?;

        let job = self.jobs.get_mut(id).expect("harvested id is a live job");

        if job.config.save_output {
            let key = job
                .config
                .shared_output_name
                .clone()
                .unwrap_or_else(|| id.to_string());
            self.store.update(&key, value, true).await;
        }

        job.remaining_repeats -= 1;
        if job.remaining_repeats > 0 {
            job.online = false;
            if job.config.reinitialize_in_repeats {
                job.handle = None;
            } else {
                let mut handle = ret.handle;
                handle.reset();
                job.handle = Some(handle);
            }
        } else {
            tracing::debug!(
                operator_id = %id,
                duration_ns = ret.metadata.end_time_ns.saturating_sub(ret.metadata.start_time_ns) as u64,
                "operator completed"
            );
            self.completed.insert(id.clone());
            self.jobs.remove(id);
            for successor in self.graph.successors(id)? {
                if !self.jobs.contains_key(&successor) && !self.completed.contains(&successor) {
                    let config = self.configs[&successor].clone();
                    self.jobs.insert(successor, Job::new(config));
                }
            }
        }

        Ok(())
    }
}

fn spec_for(config: &OperatorConfig) -> OperatorSpec {
    OperatorSpec {
        name: config.name.clone().unwrap_or_else(|| config.id.clone()),
        module_path: config.module_path.clone(),
        class_name: config.class_name.clone(),
        class_params: config.class_params.clone(),
    }
}
