//! Pending-request and subscription registries.
//!
//! Both registries are shared between the dispatch loop, which completes
//! and dispatches entries, and caller code, which creates and closes them.
//! Entries carry their own decoder, so the loop only ever looks up by id.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, SubscriptionId};

// ============================================================================
// Types
// ============================================================================

/// Completes a pending request with the raw result text or an error.
///
/// Receives the subscription registry of the same connection so a subscribe
/// call can register itself before the next inbound message is processed.
pub type Completer = Box<dyn FnOnce(Result<&str>, &SubscriptionRegistry) + Send>;

/// Decodes and delivers one subscription event.
///
/// Arguments are the notification method and the raw `result` text.
pub type EventDispatch = Arc<dyn Fn(&str, &str) -> Result<()> + Send + Sync>;

// ============================================================================
// PendingRequest
// ============================================================================

/// A request waiting for its response.
pub struct PendingRequest {
    method: String,
    complete: Completer,
}

impl PendingRequest {
    /// Creates an entry.
    pub fn new(method: impl Into<String>, complete: Completer) -> Self {
        Self {
            method: method.into(),
            complete,
        }
    }

    /// Returns the method of the request.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Completes the request. Consumes the entry, so completion happens once.
    pub fn complete(self, outcome: Result<&str>, subscriptions: &SubscriptionRegistry) {
        (self.complete)(outcome, subscriptions);
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PendingRegistry
// ============================================================================

/// Map of request ids to pending requests.
#[derive(Clone, Default)]
pub struct PendingRegistry {
    inner: Arc<Mutex<FxHashMap<RequestId, PendingRequest>>>,
}

impl PendingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request.
    ///
    /// Returns the entry back if the id is already taken.
    pub fn insert(
        &self,
        id: RequestId,
        request: PendingRequest,
    ) -> std::result::Result<(), PendingRequest> {
        let mut map = self.inner.lock();
        if map.contains_key(&id) {
            return Err(request);
        }
        map.insert(id, request);
        Ok(())
    }

    /// Removes and returns the entry for `id`.
    #[inline]
    pub fn remove(&self, id: RequestId) -> Option<PendingRequest> {
        self.inner.lock().remove(&id)
    }

    /// Returns `true` if `id` is pending.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.inner.lock().contains_key(&id)
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Fails every pending request with an error built by `error`.
    ///
    /// Returns the number of requests failed.
    pub fn fail_all(&self, error: impl Fn() -> Error, subscriptions: &SubscriptionRegistry) -> usize {
        let drained: Vec<_> = self.inner.lock().drain().collect();
        let count = drained.len();
        for (_, request) in drained {
            request.complete(Err(error()), subscriptions);
        }
        count
    }
}

impl fmt::Debug for PendingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRegistry")
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// SubscriptionRegistry
// ============================================================================

struct SubscriptionEntry {
    unsubscribe: String,
    dispatch: EventDispatch,
}

/// Map of subscription ids to event dispatchers.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<Mutex<FxHashMap<SubscriptionId, SubscriptionEntry>>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscription, replacing any entry with the same id.
    pub fn insert(&self, id: SubscriptionId, unsubscribe: impl Into<String>, dispatch: EventDispatch) {
        self.inner.lock().insert(
            id,
            SubscriptionEntry {
                unsubscribe: unsubscribe.into(),
                dispatch,
            },
        );
    }

    /// Removes the entry for `id`.
    ///
    /// Returns its unsubscribe method, or `None` if it was not registered.
    pub fn remove(&self, id: &SubscriptionId) -> Option<String> {
        self.inner.lock().remove(id).map(|entry| entry.unsubscribe)
    }

    /// Returns the dispatcher for `id`.
    ///
    /// The lock is released before the caller invokes it, so a handler may
    /// close its own subscription.
    #[must_use]
    pub fn dispatcher(&self, id: &SubscriptionId) -> Option<EventDispatch> {
        self.inner
            .lock()
            .get(id)
            .map(|entry| Arc::clone(&entry.dispatch))
    }

    /// Returns `true` if `id` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &SubscriptionId) -> bool {
        self.inner.lock().contains_key(id)
    }

    /// Returns the number of subscriptions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if there are no subscriptions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drops every subscription without notifying the server.
    ///
    /// Returns the number of subscriptions dropped.
    pub fn clear(&self) -> usize {
        let mut map = self.inner.lock();
        let count = map.len();
        map.clear();
        count
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("len", &self.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
