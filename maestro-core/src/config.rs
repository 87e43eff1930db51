//! The validated configuration record — produced by an external loader
//! (`maestro-config`) or handed in directly as an in-memory value, and
//! consumed by [`crate::Graph`](crate) construction and the scheduler.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `run_after` — either a single predecessor id or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunAfter {
    /// A single predecessor.
    One(String),
    /// Several predecessors; all must complete before this node is ready.
    Many(Vec<String>),
}

impl RunAfter {
    /// The predecessor ids, in declared order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            RunAfter::One(s) => vec![s.as_str()],
            RunAfter::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// `shared_input_params` — a bare name, a list of names (each optionally
/// `"name AS alias"`), or a mapping of initializer values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharedInputParams {
    /// `"name"` or `"name AS alias"`.
    One(String),
    /// A list of the above, each parsed independently.
    Many(Vec<String>),
    /// `{name: initial_value}` — binds current value if present (subject to
    /// `shared_input_init_only` and a type check), else initializes it.
    Init(Map<String, Value>),
}

/// One entry in `payload.operators`. Recognized-but-core-irrelevant fields
/// (`label`, `group`, `dedicated_input_variations`) are kept so they round
/// trip even though this crate never reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Node identity in the graph. Assigned by the loader if absent in the
    /// source record; by the time this type is constructed it is always set.
    pub id: String,
    /// Opaque to the core; handed to the operator loader.
    pub name: Option<String>,
    /// Opaque to the core; handed to the operator loader.
    pub module_path: String,
    /// Opaque to the core; handed to the operator loader.
    pub class_name: String,
    /// Opaque to the core; handed to the operator loader.
    #[serde(default)]
    pub class_params: Value,

    /// Literal kwargs merged first into the compiled input mapping.
    #[serde(default)]
    pub dedicated_input_params: Map<String, Value>,

    /// Reads from, or initializes, the shared store.
    pub shared_input_params: Option<SharedInputParams>,

    /// If set and the mapping-form key already exists, fail rather than bind it.
    #[serde(default)]
    pub shared_input_init_only: bool,

    /// If true, the return value is written to the shared store.
    #[serde(default)]
    pub save_output: bool,

    /// Key to write the output under; defaults to `id`.
    pub shared_output_name: Option<String>,

    /// Dependency edges; absent means "the previous node in declaration order".
    pub run_after: Option<RunAfter>,

    /// Number of times to run. Must be positive.
    #[serde(default = "default_repeat")]
    pub repeat: u32,

    /// If true, the operator handle is re-instantiated for each repeat.
    #[serde(default = "default_true")]
    pub reinitialize_in_repeats: bool,

    /// Preserved but unused: a display label.
    pub label: Option<String>,
    /// Preserved but unused: a grouping tag.
    pub group: Option<String>,
    /// Preserved but unused: the `variations`/`groups` sub-schema's
    /// per-variation input overrides.
    #[serde(default)]
    pub dedicated_input_variations: Value,
}

fn default_repeat() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// `root.header`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Optional human-readable run name.
    pub name: Option<String>,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Whether the controller dispatches with the parallel scheduler
    /// (`true`, the default) or the sequential one.
    #[serde(default = "default_true")]
    pub enable_multiprocessing: bool,
    /// Seeds the shared store before the run starts, one `add` per key.
    #[serde(default)]
    pub shared_data: Map<String, Value>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            enable_multiprocessing: true,
            shared_data: Map::new(),
        }
    }
}

/// `root.payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    /// The flat operator list. Must be non-empty.
    pub operators: Vec<OperatorConfig>,
    /// The variations/groups sub-schema. Parsed and preserved, never
    /// interpreted — out of scope for the core.
    #[serde(default)]
    pub variations: Value,
}

/// The top-level validated configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    /// Run-level metadata and scheduling mode.
    #[serde(default)]
    pub header: Header,
    /// The operator list and (unused) variations sub-schema.
    pub payload: Payload,
}
