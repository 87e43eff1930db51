//! The OperatorHandle protocol — a thin wrapper over a loaded user unit.

use crate::error::OperatorError;
use crate::value::Value;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The operator handle's lifecycle state.
///
/// `OFFLINE -> ONLINE -> COMPLETED` on success, `OFFLINE -> ONLINE -> ERROR`
/// on failure. `reset` returns a handle to `OFFLINE` so it can be reused
/// for another repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorState {
    /// Not yet dispatched.
    Offline,
    /// `run` is in progress.
    Online,
    /// `run` returned successfully.
    Completed,
    /// `run` raised.
    Error,
}

/// A capability delivered by an [`OperatorLoader`]. The scheduler depends
/// only on this contract — it never knows what concrete type implements it.
///
/// Implementations:
/// - a closure-backed handle registered with a [`crate::OperatorLoader`]
///   for tests and demos
/// - a handle wrapping a dynamically constructed user type in an embedding
///   application
///
/// The trait is intentionally one async method plus two synchronous ones.
/// The worker that owns a handle calls `run` exactly once per repeat;
/// `reinitialize_in_repeats` decides whether the worker asks for a fresh
/// handle or reuses this one across repeats.
#[async_trait]
pub trait OperatorHandle: Send + Sync {
    /// Run the operator once against the compiled input mapping.
    ///
    /// On success, transitions to [`OperatorState::Completed`] and returns
    /// the produced value. On failure, transitions to [`OperatorState::Error`]
    /// and returns the error — the worker surfaces this as the operator's
    /// error signal.
    async fn run(&mut self, inputs: BTreeMap<String, Value>) -> Result<Value, OperatorError>;

    /// Return to [`OperatorState::Offline`]. Called between repeats when
    /// `reinitialize_in_repeats` is false and the handle is reused.
    fn reset(&mut self);

    /// The handle's current lifecycle state.
    fn state(&self) -> OperatorState;
}

/// The name, module path, and construction parameters the loader needs to
/// produce an [`OperatorHandle`]. Opaque to the scheduler — these fields
/// are handed verbatim to whatever [`OperatorLoader`] the controller is
/// configured with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Human-readable name, not interpreted by the loader.
    pub name: String,
    /// Where to find the operator. For [`crate::NativeLoader`] this is a
    /// registry key; an embedding application's loader may treat it as a
    /// module or crate path.
    ///
    /// [`crate::NativeLoader`]: the native, in-process loader
    pub module_path: String,
    /// The symbol within `module_path` to construct.
    pub class_name: String,
    /// Construction parameters, passed to the constructor verbatim.
    #[serde(default)]
    pub class_params: serde_json::Value,
}

/// Resolves an [`OperatorSpec`] into a ready-to-run [`OperatorHandle`].
///
/// This is the Rust-idiomatic counterpart of dynamic, `importlib`-style
/// user code loading: a trait seam an embedding application implements,
/// rather than loading arbitrary shared objects at runtime.
#[async_trait]
pub trait OperatorLoader: Send + Sync {
    /// Produce a fresh, `Offline` handle for the given spec.
    async fn load(
        &self,
        spec: &OperatorSpec,
    ) -> Result<Box<dyn OperatorHandle>, crate::error::LoaderError>;
}
