#![deny(missing_docs)]
//! The parallel and sequential execution engine (4.D–4.G).
//!
//! [`Scheduler`] owns the completion ledger and the run's `SharedStore`; it
//! dispatches ready operators in [`WorkerGroup`] batches of `tokio::spawn`ed
//! workers, harvests their return values, and recurses until every
//! non-`ROOT` node in the graph is `completed`.

mod input;
mod job;
mod scheduler;
mod worker;
mod worker_group;

pub use input::parse_as;
pub use scheduler::Scheduler;
pub use worker::{WorkerMetadata, WorkerReturn, WorkerSignals};
pub use worker_group::WorkerGroup;
