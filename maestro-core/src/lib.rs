//! # maestro-core — data model and protocol traits for the operator orchestrator
//!
//! This crate defines the vocabulary the rest of the `maestro` workspace
//! builds on: the validated configuration record, the two protocol
//! boundaries an embedding application can swap out, and the shared error
//! taxonomy.
//!
//! ## The Protocols
//!
//! | Protocol | Trait | What it does |
//! |----------|-------|-------------|
//! | SharedStore | [`SharedStore`] | The process-wide keyed value store that threads values between operators |
//! | OperatorHandle | [`OperatorHandle`] | A thin wrapper over one loaded user unit |
//! | OperatorLoader | [`OperatorLoader`] | Resolves an [`OperatorSpec`] into a fresh [`OperatorHandle`] |
//!
//! Everything else in this crate — [`config`], [`id`], [`value`] — is data,
//! not behavior: the shapes that flow between the graph, the scheduler,
//! and the store.
//!
//! ## Design Principle
//!
//! Both protocol traits are operation-defined, not mechanism-defined.
//! [`OperatorHandle::run`] means "produce this operator's value for these
//! inputs" — not "call a Python function" or "invoke a subprocess". A
//! closure-backed test handle and a handle wrapping a dynamically
//! constructed embedding-application type implement the same trait.
//!
//! ## Dependency Notes
//!
//! This crate depends on `serde_json::Value` for the opaque payload type
//! ([`value::Value`]) threaded through the store and the operator handle.
//! The configuration schema is itself JSON-shaped, so this is not an
//! extra conversion — it's the record's native representation.

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod id;
pub mod operator;
pub mod state;
pub mod value;

pub use config::{Header, OperatorConfig, Payload, RootConfig, RunAfter, SharedInputParams};
pub use error::{ConfigError, GraphError, LoaderError, OperatorError, SchedulerError, StoreError};
pub use id::OperatorId;
pub use operator::{OperatorHandle, OperatorLoader, OperatorSpec, OperatorState};
pub use state::SharedStore;
pub use value::Value;
