//! The SharedStore protocol — the process-wide keyed value store that
//! threads values between operators.

use crate::error::StoreError;
use crate::value::Value;
use async_trait::async_trait;

/// A process-wide `string -> Value` mapping, owned exclusively by the
/// scheduler (see the concurrency notes on [`crate::OperatorHandle`]).
/// Workers never hold a reference to this trait — they publish outputs
/// through their return channel and the scheduler is the sole writer.
///
/// Implementations:
/// - an in-memory store backed by a lock, for a single run
///
/// The trait is deliberately minimal: add/get/update/exists/remove. There
/// is no search, no scoping, no versioning — those belong to state that
/// outlives a single run, which is explicitly not this crate's concern.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Insert `key -> value`. A no-op if `key` already exists — by design,
    /// initialization from this call is idempotent from the caller's point
    /// of view.
    async fn add(&self, key: &str, value: Value);

    /// Read the current value for `key`.
    async fn get(&self, key: &str) -> Result<Value, StoreError>;

    /// Overwrite `key` if present; if absent, insert iff `create` else
    /// silently skip.
    async fn update(&self, key: &str, value: Value, create: bool);

    /// Whether `key` is currently bound.
    async fn exists(&self, key: &str) -> bool;

    /// Remove `key`. A no-op if absent.
    async fn remove(&self, key: &str);
}
