//! A closure-backed [`OperatorHandle`] for tests and demos.

use async_trait::async_trait;
use maestro_core::error::OperatorError;
use maestro_core::operator::{OperatorHandle, OperatorState};
use maestro_core::value::Value;
use std::collections::BTreeMap;

/// Wraps a plain `Fn` as an [`OperatorHandle`], tracking the same
/// `Offline -> Online -> {Completed, Error}` state machine a loader-backed
/// handle would.
pub struct ClosureHandle<F> {
    f: F,
    state: OperatorState,
}

impl<F> ClosureHandle<F>
where
    F: Fn(BTreeMap<String, Value>) -> Result<Value, OperatorError> + Send + Sync,
{
    /// Wrap `f` as a fresh, `Offline` handle.
    pub fn new(f: F) -> Self {
        Self {
            f,
            state: OperatorState::Offline,
        }
    }
}

#[async_trait]
impl<F> OperatorHandle for ClosureHandle<F>
where
    F: Fn(BTreeMap<String, Value>) -> Result<Value, OperatorError> + Send + Sync,
{
    async fn run(&mut self, inputs: BTreeMap<String, Value>) -> Result<Value, OperatorError> {
        self.state = OperatorState::Online;
        match (self.f)(inputs) {
            Ok(value) => {
                self.state = OperatorState::Completed;
                Ok(value)
            }
            Err(err) => {
                self.state = OperatorState::Error;
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.state = OperatorState::Offline;
    }

    fn state(&self) -> OperatorState {
        self.state
    }
}
