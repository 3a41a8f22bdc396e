//! Live subscription handle.
//!
//! A [`Subscription`] is created when the subscribe call's response is
//! processed. Events for it are decoded and handed to the attached handler
//! from the dispatch loop; without a handler they are dropped.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;
use crate::identifiers::SubscriptionId;
use crate::protocol::{ResultType, RpcCall, RpcCoder};
use crate::transport::{Connection, EventDispatch};

use super::core::submit;

// ============================================================================
// Types
// ============================================================================

/// Event handler callback type.
///
/// Runs on the dispatch loop; long work should be moved elsewhere, e.g.
/// through [`Subscription::events`].
pub type EventHandler<T> = Arc<dyn Fn(SubscriptionEvent<T>) + Send + Sync>;

type HandlerSlot<T> = Arc<Mutex<Option<EventHandler<T>>>>;

// ============================================================================
// SubscriptionEvent
// ============================================================================

/// One decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionEvent<T> {
    /// Notification method, e.g. `chain_newHead`.
    pub method: String,
    /// Decoded payload.
    pub value: T,
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle to a server-side subscription.
///
/// Bound to the connection epoch it was created on. A reconnect drops it
/// silently; [`close`](Self::close) then becomes a no-op.
pub struct Subscription<T> {
    id: SubscriptionId,
    unsubscribe: String,
    handler: HandlerSlot<T>,
    coder: Arc<RpcCoder>,
    connection: Connection,
}

impl<T: Send + 'static> Subscription<T> {
    /// Registers a new subscription on `connection` and returns its handle.
    pub(crate) fn register(
        id: SubscriptionId,
        unsubscribe: String,
        event: ResultType<T>,
        coder: Arc<RpcCoder>,
        connection: Connection,
    ) -> Self {
        let handler: HandlerSlot<T> = Arc::new(Mutex::new(None));
        connection.subscriptions().insert(
            id.clone(),
            unsubscribe.clone(),
            event_dispatch(event, Arc::clone(&handler)),
        );

        Self {
            id,
            unsubscribe,
            handler,
            coder,
            connection,
        }
    }

    /// Returns the server-assigned id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    /// Returns the unsubscribe method name.
    #[inline]
    #[must_use]
    pub fn unsubscribe_method(&self) -> &str {
        &self.unsubscribe
    }

    /// Returns `true` while the subscription is registered.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.connection.subscriptions().contains(&self.id)
    }

    /// Sets the event handler, replacing any previous one.
    pub fn set_handler(&self, handler: impl Fn(SubscriptionEvent<T>) + Send + Sync + 'static) {
        *self.handler.lock() = Some(Arc::new(handler));
    }

    /// Clears the event handler. Later events are dropped.
    pub fn clear_handler(&self) {
        *self.handler.lock() = None;
    }

    /// Forwards events into a channel, replacing any handler.
    ///
    /// The dispatch loop only enqueues, so slow consumers never stall it.
    #[must_use]
    pub fn events(&self) -> mpsc::UnboundedReceiver<SubscriptionEvent<T>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.set_handler(move |event| {
            let _ = tx.send(event);
        });
        rx
    }

    /// Cancels the subscription.
    ///
    /// Issues the unsubscribe call and removes the registration whatever
    /// the call's outcome. Returns `Ok(false)` without a call when the
    /// subscription is no longer registered.
    ///
    /// # Errors
    ///
    /// Errors of the unsubscribe call.
    pub async fn close(self) -> Result<bool> {
        if !self.is_active() {
            return Ok(false);
        }

        let result = submit(&self.connection, &self.coder, self.unsubscribe_call()).await;
        self.connection.subscriptions().remove(&self.id);
        result
    }

    /// Unregisters a subscription nobody holds a handle for and queues its
    /// unsubscribe call without waiting for the answer.
    pub(crate) fn abandon(self) {
        self.connection.subscriptions().remove(&self.id);
        debug!(sub_id = %self.id, method = %self.unsubscribe, "Unsubscribing orphaned subscription");
        let _ = submit(&self.connection, &self.coder, self.unsubscribe_call());
    }

    fn unsubscribe_call(&self) -> RpcCall<bool> {
        RpcCall::new(self.unsubscribe.clone(), ResultType::json()).param(Value::from(&self.id))
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("unsubscribe", &self.unsubscribe)
            .field("epoch", &self.connection.epoch())
            .field("has_handler", &self.handler.lock().is_some())
            .finish()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Builds the registry entry that decodes events and calls the handler.
fn event_dispatch<T: Send + 'static>(event: ResultType<T>, handler: HandlerSlot<T>) -> EventDispatch {
    Arc::new(move |method: &str, raw: &str| {
        let Some(handler) = handler.lock().clone() else {
            return Ok(());
        };
        let value = event.decode(raw)?;
        handler(SubscriptionEvent {
            method: method.to_string(),
            value,
        });
        Ok(())
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_dispatch_without_handler_drops() {
        let slot: HandlerSlot<u64> = Arc::new(Mutex::new(None));
        let dispatch = event_dispatch(ResultType::<u64>::json(), slot);
        // Not even decoded: invalid payload is fine without a handler
        dispatch("m", "not json").expect("dropped");
    }

    #[test]
    fn test_dispatch_decodes_and_calls_handler() {
        let seen = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&seen);
        let handler: EventHandler<u64> = Arc::new(move |event: SubscriptionEvent<u64>| {
            assert_eq!(event.method, "test_event");
            sink.store(event.value, Ordering::SeqCst);
        });
        let slot: HandlerSlot<u64> = Arc::new(Mutex::new(Some(handler)));
        let dispatch = event_dispatch(ResultType::<u64>::json(), slot);

        dispatch("test_event", "42").expect("dispatch");
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert!(dispatch("test_event", "\"x\"").is_err());
    }
}
