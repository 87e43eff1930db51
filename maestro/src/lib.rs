#![deny(missing_docs)]
//! # maestro — configuration-driven operator orchestrator
//!
//! Give it a declarative list of operators and their data/ordering
//! dependencies; it builds the dependency graph, runs the operators
//! sequentially or in parallel with isolation, threads values between them
//! through a shared key-value store, and supports per-operator repetition
//! and output capture.
//!
//! [`Controller`] is the single entry point (4.H): load a config, register
//! operator constructors with a [`maestro_loader::NativeLoader`], and
//! `run()`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), maestro::ControllerError> {
//! use maestro_loader::NativeLoader;
//! use std::sync::Arc;
//!
//! let loader = Arc::new(NativeLoader::new());
//! loader.register_fn("demo::echo", |inputs| {
//!     Ok(inputs.get("x").cloned().unwrap_or_default())
//! });
//!
//! let controller = maestro::Controller::from_source("run.yaml", loader)?;
//! let store = controller.run().await?;
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

pub use maestro_core::config::{Header, OperatorConfig, Payload, RootConfig};
pub use maestro_core::error::{ConfigError, GraphError, SchedulerError};
pub use maestro_core::operator::{OperatorHandle, OperatorLoader, OperatorSpec};
pub use maestro_core::state::SharedStore;
pub use maestro_core::value::Value;
pub use maestro_graph::Graph;
pub use maestro_loader::NativeLoader;
pub use maestro_scheduler::Scheduler;
pub use maestro_store::MemoryStore;

use std::sync::Arc;
use thiserror::Error;

/// Everything that can go wrong between "have a config source" and "have a
/// populated `SharedStore`" (4.H's four steps, each with its own failure
/// mode).
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The config failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The operator graph was rejected (cycle, duplicate id, unknown
    /// `run_after`, reserved id).
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The scheduler aborted the run.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Top-level entry point: owns a validated config and an operator loader,
/// and drives a run to completion (4.H).
pub struct Controller {
    config: RootConfig,
    loader: Arc<dyn OperatorLoader>,
}

impl Controller {
    /// Build a controller directly from an already-validated config.
    pub fn new(config: RootConfig, loader: Arc<dyn OperatorLoader>) -> Self {
        Self { config, loader }
    }

    /// Load and validate a config from a source string — a path ending in
    /// `.yaml`/`.yml`/`.json`, or a raw JSON string — then build a
    /// controller over it. See [`maestro_config::load`].
    pub fn from_source(
        source: &str,
        loader: Arc<dyn OperatorLoader>,
    ) -> Result<Self, ControllerError> {
        let config = maestro_config::load(source)?;
        Ok(Self::new(config, loader))
    }

    /// Validate and build a controller from an in-memory config value,
    /// without touching the filesystem. See [`maestro_config::load_value`].
    pub fn from_value(
        value: Value,
        loader: Arc<dyn OperatorLoader>,
    ) -> Result<Self, ControllerError> {
        let config = maestro_config::load_value(value)?;
        Ok(Self::new(config, loader))
    }

    /// Run the configured operators to completion.
    ///
    /// 1. Seed a fresh [`MemoryStore`] from `header.shared_data`.
    /// 2. Build the [`Graph`].
    /// 3. Dispatch to [`Scheduler::run_parallel`] if
    ///    `header.enable_multiprocessing`, else [`Scheduler::run_sequential`].
    ///
    /// Returns the store so callers can read back whatever the run saved.
    pub async fn run(self) -> Result<Arc<dyn SharedStore>, ControllerError> {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        for (key, value) in &self.config.header.shared_data {
            store.add(key, value.clone()).await;
        }

        let graph = Graph::build(&self.config.payload.operators)?;
        let parallel = self.config.header.enable_multiprocessing;

        tracing::debug!(
            operators = self.config.payload.operators.len(),
            parallel,
            "starting run"
        );

        let scheduler = Scheduler::new(
            graph,
            &self.config.payload.operators,
            Arc::clone(&store),
            self.loader,
        );

        if parallel {
            scheduler.run_parallel().await?;
        } else {
            scheduler.run_sequential().await?;
        }

        tracing::debug!("run completed");
        Ok(store)
    }
}
