// ── Key-path store seam ──
//
// The one abstraction the rest of the workspace programs against.
// `RtdbClient` implements it for the hosted store, `MemoryStore` for
// tests and offline bootstrap.

use futures_core::stream::BoxStream;
use serde_json::Value;

use crate::error::Error;

/// One item on a subscription stream: either the full value now held at
/// the watched path, or the single terminal error.
#[derive(Debug)]
pub enum StoreEvent {
    /// The value at the watched path. The first event after attach is the
    /// value already present (replay-latest); later events follow writes.
    Value(Value),
    /// Transport failure. Exactly one of these is emitted, after which the
    /// stream is exhausted — the caller must `watch` again to resume.
    Error(Error),
}

/// A remote (or in-process) store of JSON values addressed by `/`-separated
/// key paths.
///
/// Writes are full-value overwrites with last-write-wins semantics; there
/// are no partial or transactional updates. `watch` streams never reconnect
/// on their own — error recovery belongs to the subscriber.
pub trait KeyPathStore: Send + Sync + 'static {
    /// Overwrite the value at `path`.
    fn put(&self, path: &str, value: Value)
    -> impl Future<Output = Result<(), Error>> + Send;

    /// Remove the value at `path` (and any children).
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// One-shot read of the value at `path`. Absent paths read as `null`.
    fn get(&self, path: &str) -> impl Future<Output = Result<Value, Error>> + Send;

    /// Subscribe to `path`. See [`StoreEvent`] for the stream contract.
    fn watch(&self, path: &str) -> BoxStream<'static, StoreEvent>;
}
