//! In-memory implementation of `RealtimeDatabase`.
//!
//! `InMemoryDatabase` keeps one JSON tree addressed by slash-separated
//! paths (`patients/1/cardiovascular`). Writing `null` deletes a node and
//! prunes parents left empty, so a deleted subtree reads back as absent.
//!
//! Observers are notified after every write whose path overlaps theirs:
//! a write at or below the observed path, or above it. Callbacks always run
//! after the state lock is released, so they may read or write the database
//! themselves, or cancel any observer. Observers are called in registration
//! order, and each is checked for cancellation right before its call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use pulsoft_contracts::{
    error::{PulsoftError, PulsoftResult},
    remote::Snapshot,
    subscription::SubscriptionId,
};
use pulsoft_core::traits::{ErrorCallback, ObserverHandle, RealtimeDatabase, SnapshotCallback};

// ── Internal mutable state ────────────────────────────────────────────────────

type SharedSnapshotFn = Arc<dyn Fn(Snapshot) + Send + Sync>;
type SharedErrorFn = Arc<dyn Fn(PulsoftError) + Send + Sync>;

struct Observer {
    /// Registration order.
    seq: u64,
    /// Cleared when the observer is removed.
    live: Arc<AtomicBool>,
    path: String,
    segments: Vec<String>,
    on_snapshot: SharedSnapshotFn,
    on_error: SharedErrorFn,
}

struct DbState {
    root: Value,
    observers: HashMap<SubscriptionId, Observer>,
    next_seq: u64,
    offline: bool,
}

struct Notification {
    seq: u64,
    live: Arc<AtomicBool>,
    on_snapshot: SharedSnapshotFn,
    snapshot: Snapshot,
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn segments_of(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when one path is an ancestor of, or equal to, the other.
fn overlaps(a: &[String], b: &[String]) -> bool {
    let shared = a.len().min(b.len());
    a[..shared] == b[..shared]
}

fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn lookup(root: &Value, segments: &[String]) -> Option<Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    if is_vacant(node) {
        None
    } else {
        Some(node.clone())
    }
}

fn store(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        store(child, rest, value);
        if is_vacant(child) {
            map.remove(head);
        }
    }
}

fn database_error(reason: impl Into<String>) -> PulsoftError {
    PulsoftError::Database {
        reason: reason.into(),
    }
}

// ── Public database ───────────────────────────────────────────────────────────

/// A process-local real-time database.
///
/// Cloning shares the same tree and observer set.
#[derive(Clone)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<DbState>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::with_root(Value::Object(Map::new()))
    }

    /// Start from an existing tree, e.g. a JSON export.
    pub fn with_root(root: Value) -> Self {
        Self {
            state: Arc::new(Mutex::new(DbState {
                root,
                observers: HashMap::new(),
                next_seq: 0,
                offline: false,
            })),
        }
    }

    /// Simulate losing (or regaining) the connection.
    ///
    /// Going offline fails every registered observer through its error
    /// callback and removes it. While offline, reads and writes return
    /// `PulsoftError::Database` and new observers fail immediately.
    pub fn set_offline(&self, offline: bool) {
        let failed: Vec<(String, SharedErrorFn)> = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.offline = offline;
            if offline {
                state
                    .observers
                    .drain()
                    .map(|(_, o)| {
                        o.live.store(false, Ordering::SeqCst);
                        (o.path, o.on_error)
                    })
                    .collect()
            } else {
                Vec::new()
            }
        };

        info!(offline, dropped_observers = failed.len(), "database connectivity changed");
        for (path, on_error) in failed {
            (*on_error)(database_error(format!("connection lost while observing '{}'", path)));
        }
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .observers
            .len()
    }
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("InMemoryDatabase")
            .field("observers", &state.observers.len())
            .field("offline", &state.offline)
            .finish()
    }
}

// ── RealtimeDatabase impl ─────────────────────────────────────────────────────

#[async_trait]
impl RealtimeDatabase for InMemoryDatabase {
    fn observe(
        &self,
        path: &str,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> ObserverHandle {
        let id = SubscriptionId::new();
        let segments = segments_of(path);
        let on_snapshot: SharedSnapshotFn = Arc::from(on_snapshot);
        let on_error: SharedErrorFn = Arc::from(on_error);
        let live = Arc::new(AtomicBool::new(true));

        let initial = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.offline {
                None
            } else {
                let value = lookup(&state.root, &segments);
                let seq = state.next_seq;
                state.next_seq += 1;
                state.observers.insert(
                    id,
                    Observer {
                        seq,
                        live: Arc::clone(&live),
                        path: path.to_string(),
                        segments,
                        on_snapshot: Arc::clone(&on_snapshot),
                        on_error: Arc::clone(&on_error),
                    },
                );
                Some(value)
            }
        };

        let Some(value) = initial else {
            warn!(path = %path, "observe attempted while offline");
            (*on_error)(database_error(format!("cannot observe '{}': database offline", path)));
            return ObserverHandle::detached(id);
        };

        debug!(subscription_id = %id, path = %path, "observer registered");
        (*on_snapshot)(Snapshot {
            path: path.to_string(),
            value,
        });

        let state = Arc::clone(&self.state);
        ObserverHandle::new(id, move || {
            let removed = state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .observers
                .remove(&id)
                .is_some();
            live.store(false, Ordering::SeqCst);
            if removed {
                debug!(subscription_id = %id, "observer removed");
            }
        })
    }

    async fn read_once(&self, path: &str) -> PulsoftResult<Snapshot> {
        let state = self.state.lock().map_err(|e| {
            database_error(format!("database state lock poisoned: {}", e))
        })?;
        if state.offline {
            return Err(database_error(format!("cannot read '{}': database offline", path)));
        }
        Ok(Snapshot {
            path: path.to_string(),
            value: lookup(&state.root, &segments_of(path)),
        })
    }

    async fn write(&self, path: &str, value: Value) -> PulsoftResult<()> {
        let written = segments_of(path);

        let mut notifications: Vec<Notification> = {
            let mut state = self.state.lock().map_err(|e| {
                database_error(format!("database state lock poisoned: {}", e))
            })?;
            if state.offline {
                return Err(database_error(format!("cannot write '{}': database offline", path)));
            }

            store(&mut state.root, &written, value);

            let DbState { root, observers, .. } = &*state;
            observers
                .values()
                .filter(|o| overlaps(&o.segments, &written))
                .map(|o| Notification {
                    seq: o.seq,
                    live: Arc::clone(&o.live),
                    on_snapshot: Arc::clone(&o.on_snapshot),
                    snapshot: Snapshot {
                        path: o.path.clone(),
                        value: lookup(root, &o.segments),
                    },
                })
                .collect()
        };
        notifications.sort_by_key(|n| n.seq);

        debug!(path = %path, notified = notifications.len(), "database write applied");
        for n in notifications {
            // An earlier callback may have cancelled this observer.
            if n.live.load(Ordering::SeqCst) {
                (*n.on_snapshot)(n.snapshot);
            }
        }
        Ok(())
    }
}
