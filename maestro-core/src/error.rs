//! Error types for each protocol boundary.

use thiserror::Error;

/// Errors raised while loading or validating a configuration record.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config source could not be read or parsed (bad path, bad YAML/JSON).
    #[error("config invalid: {0}")]
    Invalid(String),

    /// An operator config used a key the schema doesn't recognize.
    #[error("unknown key \"{key}\" on operator \"{operator_id}\"")]
    UnknownKey {
        /// The operator the bad key was found on.
        operator_id: String,
        /// The offending key.
        key: String,
    },

    /// Two operators in the payload declared the same id.
    #[error("duplicate operator id: {0}")]
    DuplicateOperatorId(String),

    /// `payload.operators` was empty.
    #[error("payload.operators must be non-empty")]
    EmptyOperatorList,
}

/// Errors raised while building or querying the dependency graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two operators declared the same id.
    #[error("duplicate operator id: {0}")]
    DuplicateOperatorId(String),

    /// The graph contains a cycle.
    #[error("cycle detected in operator graph")]
    CycleDetected,

    /// A `run_after` entry named an id that doesn't exist in the graph.
    #[error("run_after references unknown operator: {0}")]
    UnknownRunAfter(String),

    /// An operator tried to use the reserved `ROOT` id.
    #[error("operator id \"ROOT\" is reserved")]
    ProtectedIdUsed,

    /// A query referenced an id not present in the graph.
    #[error("no such node: {0}")]
    NoSuchNode(String),
}

/// Errors raised by the shared-memory store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `get` on a key that isn't present.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors raised while compiling a job's inputs or running its operator.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OperatorError {
    /// A `shared_input_params` entry named a key that doesn't exist in the store.
    #[error("missing shared input: {0}")]
    MissingSharedInput(String),

    /// `shared_input_init_only` was set and the key already existed.
    #[error("already initialized: {0}")]
    AlreadyInitialized(String),

    /// An existing shared value's type didn't match the initializer's type.
    #[error("type mismatch for shared key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The shared key being bound.
        key: String,
        /// The JSON type of the existing value.
        expected: String,
        /// The JSON type of the initializer.
        found: String,
    },

    /// A `shared_input_params` string wasn't a valid bare name or `"name AS alias"` form.
    #[error("invalid input spec: {0}")]
    InvalidInputSpec(String),

    /// The operator's own `run` raised.
    #[error("operator runtime error: {0}")]
    Runtime(String),
}

/// Errors raised by the scheduler's execution loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// An operator failed; the run is aborted.
    #[error("operator {operator_id} failed: {source}")]
    OperatorFailed {
        /// The id of the operator that failed.
        operator_id: String,
        /// The underlying error.
        #[source]
        source: OperatorError,
    },

    /// An operator's handle could not be constructed.
    #[error("operator {operator_id} failed to load: {source}")]
    LoaderFailed {
        /// The id of the operator whose handle failed to load.
        operator_id: String,
        /// The underlying error.
        #[source]
        source: LoaderError,
    },

    /// One or more workers in a group raised; the whole run is aborted.
    #[error("run aborted: {0}")]
    Aborted(String),

    /// The graph rejected construction or a readiness query.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised by an operator loader implementation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoaderError {
    /// `module_path` didn't resolve to a known module/registry entry.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// `class_name` didn't resolve within the resolved module.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// The resolved constructor was invoked but failed.
    #[error("construct failed: {0}")]
    ConstructFailed(String),
}
