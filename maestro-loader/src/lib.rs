#![deny(missing_docs)]
//! `NativeLoader` — the native, in-process `OperatorLoader` implementation.
//!
//! Resolves an [`OperatorSpec`]'s `module_path` against an in-process
//! registry of named constructors, populated by the embedding application
//! via [`NativeLoader::register`]. This is the Rust-idiomatic counterpart
//! of dynamic `importlib`-style loading: no shared objects, no reflection
//! — a closure the caller already compiled in.

mod closure;

pub use closure::ClosureHandle;

use async_trait::async_trait;
use maestro_core::error::{LoaderError, OperatorError};
use maestro_core::operator::{OperatorHandle, OperatorLoader, OperatorSpec};
use maestro_core::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

type Constructor =
    Arc<dyn Fn(&Value) -> Result<Box<dyn OperatorHandle>, LoaderError> + Send + Sync>;

/// A registry-backed [`OperatorLoader`].
///
/// `module_path` is a free-form namespace string (e.g. `"demo::echo"`),
/// not a filesystem or dynamic-library path — the registry only ever
/// resolves constructors the process itself registered.
#[derive(Default)]
pub struct NativeLoader {
    registry: RwLock<HashMap<String, Constructor>>,
}

impl NativeLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `module_path`. Re-registering the same
    /// path overwrites the previous constructor.
    pub fn register<F>(&self, module_path: impl Into<String>, constructor: F)
    where
        F: Fn(&Value) -> Result<Box<dyn OperatorHandle>, LoaderError> + Send + Sync + 'static,
    {
        self.registry
            .write()
            .expect("registry lock poisoned")
            .insert(module_path.into(), Arc::new(constructor));
    }

    /// Register a plain closure-backed operator under `module_path`,
    /// wrapping it in a fresh [`ClosureHandle`] on every load. Convenient
    /// for tests and demos that don't need construction parameters.
    pub fn register_fn<F>(&self, module_path: impl Into<String>, f: F)
    where
        F: Fn(BTreeMap<String, Value>) -> Result<Value, OperatorError>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        self.register(module_path, move |_params| {
            Ok(Box::new(ClosureHandle::new(f.clone())) as Box<dyn OperatorHandle>)
        });
    }
}

#[async_trait]
impl OperatorLoader for NativeLoader {
    async fn load(&self, spec: &OperatorSpec) -> Result<Box<dyn OperatorHandle>, LoaderError> {
        let constructor = {
            let registry = self.registry.read().expect("registry lock poisoned");
            registry.get(&spec.module_path).cloned()
        }
        .ok_or_else(|| LoaderError::ModuleNotFound(spec.module_path.clone()))?;

        constructor(&spec.class_params)
    }
}
