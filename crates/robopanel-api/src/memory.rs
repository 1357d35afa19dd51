//! In-process [`KeyPathStore`] backed by a single JSON tree.
//!
//! Serves two purposes: core-crate tests exercise the full gateway and
//! synchronizer against it without a network, and it doubles as a
//! bootstrap target when no store is configured. Watch streams follow the
//! same contract as the remote client: replay-latest on attach, one
//! terminal error on failure, no self-reconnect.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_core::stream::BoxStream;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::Error;
use crate::sse::{apply_update, value_at_path};
use crate::store::{KeyPathStore, StoreEvent};

const NOTIFY_CAPACITY: usize = 64;

/// Failure class injectable into a watch stream under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFault {
    Timeout,
    PermissionDenied,
    Unavailable,
}

impl StreamFault {
    fn into_error(self) -> Error {
        match self {
            Self::Timeout => Error::Timeout { timeout_secs: 0 },
            Self::PermissionDenied => Error::Http {
                status: 403,
                body: "permission denied".into(),
            },
            Self::Unavailable => Error::StreamClosed {
                reason: "injected outage".into(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Mutation {
    Changed,
    Fault { path: String, fault: StreamFault },
}

struct Inner {
    tree: Mutex<Value>,
    notify: broadcast::Sender<Mutation>,
    put_counts: Mutex<HashMap<String, usize>>,
    delete_counts: Mutex<HashMap<String, usize>>,
    watch_counts: Mutex<HashMap<String, usize>>,
    put_faults: Mutex<HashMap<String, StreamFault>>,
}

/// Shared in-memory store. Clones view the same tree.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                tree: Mutex::new(Value::Null),
                notify,
                put_counts: Mutex::new(HashMap::new()),
                delete_counts: Mutex::new(HashMap::new()),
                watch_counts: Mutex::new(HashMap::new()),
                put_faults: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Terminate every active watch on `path` with the given fault.
    /// Subsequent `watch` calls attach fresh, healthy streams.
    pub fn fail_stream(&self, path: &str, fault: StreamFault) {
        let _ = self.inner.notify.send(Mutation::Fault {
            path: normalize(path),
            fault,
        });
    }

    /// Make every `put` against `path` fail with the given fault until
    /// [`clear_put_fault`](Self::clear_put_fault) is called.
    pub fn fail_puts(&self, path: &str, fault: StreamFault) {
        self.inner
            .put_faults
            .lock()
            .expect("fault table poisoned")
            .insert(normalize(path), fault);
    }

    /// Let writes against `path` succeed again.
    pub fn clear_put_fault(&self, path: &str) {
        self.inner
            .put_faults
            .lock()
            .expect("fault table poisoned")
            .remove(&normalize(path));
    }

    /// Number of `put` calls issued against `path`.
    pub fn put_count(&self, path: &str) -> usize {
        count(&self.inner.put_counts, path)
    }

    /// Number of `delete` calls issued against `path`.
    pub fn delete_count(&self, path: &str) -> usize {
        count(&self.inner.delete_counts, path)
    }

    /// Number of watch streams ever attached to `path`.
    pub fn watch_count(&self, path: &str) -> usize {
        count(&self.inner.watch_counts, path)
    }

    fn apply(&self, path: &str, value: Value) {
        let mut tree = self.inner.tree.lock().expect("store tree poisoned");
        apply_update(&mut tree, path, value, false);
        drop(tree);
        let _ = self.inner.notify.send(Mutation::Changed);
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_owned()
}

fn count(counts: &Mutex<HashMap<String, usize>>, path: &str) -> usize {
    counts
        .lock()
        .expect("counter poisoned")
        .get(&normalize(path))
        .copied()
        .unwrap_or(0)
}

fn bump(counts: &Mutex<HashMap<String, usize>>, path: &str) {
    *counts
        .lock()
        .expect("counter poisoned")
        .entry(normalize(path))
        .or_insert(0) += 1;
}

impl KeyPathStore for MemoryStore {
    async fn put(&self, path: &str, value: Value) -> Result<(), Error> {
        bump(&self.inner.put_counts, path);
        let fault = self
            .inner
            .put_faults
            .lock()
            .expect("fault table poisoned")
            .get(&normalize(path))
            .copied();
        if let Some(fault) = fault {
            return Err(fault.into_error());
        }
        self.apply(path, value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        bump(&self.inner.delete_counts, path);
        self.apply(path, Value::Null);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Value, Error> {
        let tree = self.inner.tree.lock().expect("store tree poisoned");
        Ok(value_at_path(&tree, path).clone())
    }

    fn watch(&self, path: &str) -> BoxStream<'static, StoreEvent> {
        bump(&self.inner.watch_counts, path);

        let inner = Arc::clone(&self.inner);
        let path = normalize(path);
        // Subscribe before the initial read so no mutation between read
        // and loop start is missed.
        let mut rx = inner.notify.subscribe();

        Box::pin(async_stream::stream! {
            let mut last = {
                let tree = inner.tree.lock().expect("store tree poisoned");
                value_at_path(&tree, &path).clone()
            };
            yield StoreEvent::Value(last.clone());

            loop {
                match rx.recv().await {
                    Ok(Mutation::Changed) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        let current = {
                            let tree = inner.tree.lock().expect("store tree poisoned");
                            value_at_path(&tree, &path).clone()
                        };
                        if current != last {
                            last = current.clone();
                            yield StoreEvent::Value(current);
                        }
                    }
                    Ok(Mutation::Fault { path: failed, fault }) => {
                        if failed == path {
                            yield StoreEvent::Error(fault.into_error());
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    async fn next_value(stream: &mut BoxStream<'static, StoreEvent>) -> Value {
        match stream.next().await.expect("stream ended") {
            StoreEvent::Value(v) => v,
            StoreEvent::Error(e) => panic!("unexpected stream error: {e}"),
        }
    }

    #[tokio::test]
    async fn watch_replays_latest_then_pushes_changes() {
        let store = MemoryStore::new();
        store.put("device_status", json!({"isOnline": true})).await.unwrap();

        let mut stream = store.watch("device_status");
        assert_eq!(next_value(&mut stream).await, json!({"isOnline": true}));

        store.put("device_status", json!({"isOnline": false})).await.unwrap();
        assert_eq!(next_value(&mut stream).await, json!({"isOnline": false}));
    }

    #[tokio::test]
    async fn collection_watch_sees_child_writes_and_deletes() {
        let store = MemoryStore::new();
        let mut stream = store.watch("warning_alerts");
        assert_eq!(next_value(&mut stream).await, Value::Null);

        store.put("warning_alerts/w1", json!({"title": "leak"})).await.unwrap();
        assert_eq!(
            next_value(&mut stream).await,
            json!({"w1": {"title": "leak"}})
        );

        store.delete("warning_alerts/w1").await.unwrap();
        assert_eq!(next_value(&mut stream).await, Value::Null);
        assert_eq!(store.delete_count("warning_alerts/w1"), 1);
    }

    #[tokio::test]
    async fn injected_fault_terminates_the_stream() {
        let store = MemoryStore::new();
        let mut stream = store.watch("device_status");
        let _ = next_value(&mut stream).await;

        store.fail_stream("device_status", StreamFault::PermissionDenied);
        match stream.next().await.unwrap() {
            StoreEvent::Error(e) => assert!(e.is_permission()),
            StoreEvent::Value(v) => panic!("expected error, got {v}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn unrelated_paths_do_not_cross_notify() {
        let store = MemoryStore::new();
        let mut stream = store.watch("emergency_commands");
        let _ = next_value(&mut stream).await;

        // A write elsewhere must not surface on this channel.
        store.put("iot_commands", json!({"displayText": "hi"})).await.unwrap();
        store.put("emergency_commands", json!({"action": "activate"})).await.unwrap();

        assert_eq!(
            next_value(&mut stream).await,
            json!({"action": "activate"})
        );
    }
}
