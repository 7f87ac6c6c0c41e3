//! Collaborator trait definitions for the Pulsoft monitoring core.
//!
//! These four traits are the complete boundary between this workspace and
//! the outside world:
//!
//! - `RandomSource`: where perturbations come from
//! - `AuthProvider`: who is signed in and what token they carry
//! - `Transport`: how a request reaches the REST backend
//! - `RealtimeDatabase`: the observe/read/write document store
//!
//! Every trait is object safe so the service can hold `Arc<dyn _>` and tests
//! can substitute deterministic or failing implementations.

use async_trait::async_trait;
use serde_json::Value;

use pulsoft_contracts::{
    error::{PulsoftError, PulsoftResult},
    remote::{ApiRequest, AuthUser, Snapshot},
    subscription::SubscriptionId,
};

/// A source of uniformly distributed values in `[0, 1)`.
///
/// The generator maps each draw `u` to a perturbation `(u - 0.5) * spread`,
/// so a source that always returns `0.5` yields exact baselines.
pub trait RandomSource: Send + Sync {
    /// Return the next value in `[0, 1)`.
    fn next_unit(&self) -> f64;
}

/// The authentication collaborator.
///
/// Session and token lifecycle are entirely the provider's business; the
/// core only asks who is signed in and for a bearer token to send.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, or `None`.
    fn current_user(&self) -> Option<AuthUser>;

    /// A bearer token for the signed-in user.
    ///
    /// Returns `PulsoftError::Unauthenticated` when nobody is signed in.
    async fn id_token(&self) -> PulsoftResult<String>;
}

/// Delivers one request to the REST backend and returns its decoded JSON body.
///
/// Implementations make exactly one attempt. They must map a non-2xx status
/// to `HttpStatus`, an undecodable body to `MalformedPayload`, and anything
/// that prevented a response to `Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest, bearer_token: &str) -> PulsoftResult<Value>;
}

/// Callback invoked with every snapshot delivered to an observer.
pub type SnapshotCallback = Box<dyn Fn(Snapshot) + Send + Sync>;

/// Callback invoked when an observer can no longer be served.
pub type ErrorCallback = Box<dyn Fn(PulsoftError) + Send + Sync>;

/// The real-time document database collaborator.
#[async_trait]
pub trait RealtimeDatabase: Send + Sync {
    /// Start observing `path`.
    ///
    /// `on_snapshot` receives the current value promptly and again after
    /// every write that touches `path`. Observation stops when the returned
    /// handle is cancelled or dropped: no delivery starts after that returns,
    /// though one already running on another thread may still finish.
    fn observe(
        &self,
        path: &str,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> ObserverHandle;

    /// Read the value at `path` once.
    async fn read_once(&self, path: &str) -> PulsoftResult<Snapshot>;

    /// Replace the value at `path`, creating intermediate nodes as needed.
    async fn write(&self, path: &str, value: Value) -> PulsoftResult<()>;
}

/// Scoped handle for a database observer.
///
/// Holding the handle keeps the observer registered; cancelling or dropping
/// it runs the unsubscribe action exactly once.
pub struct ObserverHandle {
    id: SubscriptionId,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl ObserverHandle {
    pub fn new(id: SubscriptionId, unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A handle with nothing to undo, for observers that never registered.
    pub fn detached(id: SubscriptionId) -> Self {
        Self { id, unsubscribe: None }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stop observing now.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("id", &self.id)
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
