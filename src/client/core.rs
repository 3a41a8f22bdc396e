//! Core client implementation.
//!
//! The [`Client`] owns one logical connection to a node. Each successful
//! [`connect`](Client::connect) starts a new epoch: the id counter returns
//! to 0, registries start empty and everything pending on the previous
//! socket fails with [`Error::ConnectionReset`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{Epoch, RequestId, SubscriptionId};
use crate::protocol::{RpcCall, RpcCoder, RpcError, SubscribeCall};
use crate::transport::{CloseReason, Connection, PendingRequest, SubscriptionRegistry};

use super::builder::ClientBuilder;
use super::future::ResponseFuture;
use super::options::ClientOptions;
use super::subscription::Subscription;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle of a client's logical connection.
///
/// `Disconnected → Connecting → Open → Closing → Closed`. A reconnect goes
/// from `Open` back through `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Socket open, calls accepted.
    Open,
    /// Close in progress.
    Closing,
    /// Closed for good.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Types
// ============================================================================

/// The socket of the current epoch and its loop task.
struct Active {
    connection: Connection,
    task: JoinHandle<()>,
}

/// Mutable client state.
struct State {
    phase: ConnectionState,
    epoch: Epoch,
    active: Option<Active>,
}

/// Shared client internals.
struct ClientInner {
    url: Url,
    options: ClientOptions,
    coder: Arc<RpcCoder>,
    state: Mutex<State>,
    /// Serializes connect and close.
    lifecycle: tokio::sync::Mutex<()>,
}

// ============================================================================
// Client
// ============================================================================

/// Multiplexed JSON-RPC client over one WebSocket.
///
/// Cheap to clone; clones share the connection. Calls may be submitted
/// concurrently from any task.
///
/// # Example
///
/// ```no_run
/// use dotwire::Client;
/// use dotwire::protocol::{StandardCommands, StandardSubscriptions};
///
/// # async fn example() -> dotwire::Result<()> {
/// let client = Client::builder().url("ws://127.0.0.1:9944").connect().await?;
///
/// let head = client.execute(StandardCommands::finalized_head()).await?;
/// println!("finalized: {head}");
///
/// let heads = client.subscribe(StandardSubscriptions::new_heads()).await?;
/// let mut events = heads.events();
/// if let Some(event) = events.recv().await {
///     println!("new head #{}", event.value.number);
/// }
/// heads.close().await?;
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.url.as_str())
            .field("state", &self.state())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Construction
// ============================================================================

impl Client {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a disconnected client.
    pub(crate) fn new(url: Url, options: ClientOptions) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                url,
                options,
                coder: Arc::new(RpcCoder::new()),
                state: Mutex::new(State {
                    phase: ConnectionState::Disconnected,
                    epoch: Epoch::default(),
                    active: None,
                }),
                lifecycle: tokio::sync::Mutex::new(()),
            }),
        }
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Opens a connection, starting a new epoch.
    ///
    /// On an open client this reconnects: the old socket is closed and its
    /// pending calls fail with [`Error::ConnectionReset`] before this
    /// returns. If the handshake fails, the previous socket stays in use.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the client was closed
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds the timeout
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(&self) -> Result<()> {
        let _lifecycle = self.inner.lifecycle.lock().await;

        let (previous, epoch) = {
            let mut state = self.inner.state.lock();
            if state.phase == ConnectionState::Closed {
                return Err(Error::ConnectionClosed);
            }
            let previous = state.phase;
            state.phase = ConnectionState::Connecting;
            (previous, state.epoch.next())
        };

        let opened = Connection::open(
            &self.inner.url,
            self.inner.options.connect_timeout,
            epoch,
            self.inner.options.connection_config(),
        )
        .await;

        let (connection, task) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                let mut state = self.inner.state.lock();
                state.phase = match &state.active {
                    Some(active) if !active.connection.is_closed() => previous,
                    _ => ConnectionState::Disconnected,
                };
                warn!(url = %self.inner.url, %epoch, error = %e, "Connect failed");
                return Err(e);
            }
        };

        let replaced = {
            let mut state = self.inner.state.lock();
            state.epoch = epoch;
            state.phase = ConnectionState::Open;
            self.inner.coder.reset_id();
            state.active.replace(Active { connection, task })
        };

        if let Some(old) = replaced {
            debug!(old = %old.connection.epoch(), new = %epoch, "Resetting previous epoch");
            old.connection.shutdown(CloseReason::Reset);
            let _ = old.task.await;
        }

        info!(url = %self.inner.url, %epoch, "Connected");
        Ok(())
    }

    /// Closes the client.
    ///
    /// Pending calls fail with [`Error::ConnectionClosed`], subscriptions
    /// are dropped without unsubscribe calls and a normal-closure frame is
    /// sent. Later calls fail with [`Error::NotConnected`]. The close
    /// callback runs once.
    pub async fn close(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;

        let active = {
            let mut state = self.inner.state.lock();
            if state.phase == ConnectionState::Closed {
                return;
            }
            state.phase = ConnectionState::Closing;
            state.active.take()
        };

        if let Some(active) = active {
            active.connection.shutdown(CloseReason::Closed);
            let _ = active.task.await;
        }

        self.inner.state.lock().phase = ConnectionState::Closed;
        info!(url = %self.inner.url, "Client closed");

        if let Some(callback) = &self.inner.options.on_close {
            callback();
        }
    }
}

// ============================================================================
// Client - Calls
// ============================================================================

impl Client {
    /// Submits a call.
    ///
    /// Returns immediately; the handle resolves when the response arrives
    /// or the connection ends. Fails with [`Error::NotConnected`] unless
    /// the client is open.
    pub fn execute<T: Send + 'static>(&self, call: RpcCall<T>) -> ResponseFuture<T> {
        match self.current_connection() {
            Some(connection) => submit(&connection, &self.inner.coder, call),
            None => ResponseFuture::failed(Error::NotConnected),
        }
    }

    /// Opens a subscription.
    ///
    /// The subscription is registered while the subscribe response is
    /// processed, before any later message. Events the node sends before
    /// that response are dropped. If the returned handle is dropped before
    /// the response, the subscription is cancelled right away.
    pub fn subscribe<T: Send + 'static>(
        &self,
        call: SubscribeCall<T>,
    ) -> ResponseFuture<Subscription<T>> {
        let Some(connection) = self.current_connection() else {
            return ResponseFuture::failed(Error::NotConnected);
        };

        let (method, unsubscribe, params, event) = call.into_parts();
        let (tx, future) = ResponseFuture::channel();
        let id = self.inner.coder.next_id();
        let payload = match self.inner.coder.encode(id, &method, &params) {
            Ok(payload) => payload,
            Err(e) => return ResponseFuture::failed(e),
        };

        let coder = Arc::clone(&self.inner.coder);
        let owner = connection.clone();
        let complete = move |outcome: Result<&str>, _: &SubscriptionRegistry| {
            let result = outcome.and_then(parse_subscription_id).map(|sub_id| {
                trace!(%sub_id, "Subscription registered");
                Subscription::register(sub_id, unsubscribe, event, coder, owner)
            });
            // Caller dropped the handle before the response arrived
            if let Err(Ok(orphan)) = tx.send(result) {
                orphan.abandon();
            }
        };

        connection.send(id, payload, PendingRequest::new(method, Box::new(complete)));
        future
    }
}

// ============================================================================
// Client - Introspection
// ============================================================================

impl Client {
    /// Returns the node endpoint.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Returns the lifecycle state.
    ///
    /// An open client whose socket was closed by the node reports
    /// [`ConnectionState::Disconnected`].
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        let state = self.inner.state.lock();
        match (&state.phase, &state.active) {
            (ConnectionState::Open, Some(active)) if active.connection.is_closed() => {
                ConnectionState::Disconnected
            }
            (phase, _) => *phase,
        }
    }

    /// Returns the current epoch; 0 before the first connect.
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.inner.state.lock().epoch
    }

    /// Returns the number of calls awaiting a response on this epoch.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map_or(0, |active| active.connection.pending().len())
    }

    /// Returns the number of live subscriptions on this epoch.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map_or(0, |active| active.connection.subscriptions().len())
    }

    /// Returns the id the next call will use.
    #[must_use]
    pub fn next_request_id(&self) -> RequestId {
        self.inner.coder.peek_id()
    }

    /// Returns the open connection, if any.
    fn current_connection(&self) -> Option<Connection> {
        let state = self.inner.state.lock();
        if state.phase != ConnectionState::Open {
            return None;
        }
        state
            .active
            .as_ref()
            .filter(|active| !active.connection.is_closed())
            .map(|active| active.connection.clone())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Encodes `call`, queues it on `connection` and returns its handle.
pub(crate) fn submit<T: Send + 'static>(
    connection: &Connection,
    coder: &RpcCoder,
    call: RpcCall<T>,
) -> ResponseFuture<T> {
    let (method, params, result) = call.into_parts();
    let id = coder.next_id();
    let payload = match coder.encode(id, &method, &params) {
        Ok(payload) => payload,
        Err(e) => return ResponseFuture::failed(e),
    };

    let (tx, future) = ResponseFuture::channel();
    let complete = move |outcome: Result<&str>, _: &SubscriptionRegistry| {
        let _ = tx.send(outcome.and_then(|raw| result.decode(raw)));
    };

    trace!(%id, %method, "Request queued");
    connection.send(id, payload, PendingRequest::new(method, Box::new(complete)));
    future
}

/// Parses the result of a subscribe call.
fn parse_subscription_id(raw: &str) -> Result<SubscriptionId> {
    serde_json::from_str(raw).map_err(|e| {
        Error::rpc(
            RpcError::INTERNAL_ERROR,
            format!("invalid subscription id: {raw}"),
            Some(e.to_string()),
        )
    })
}

// ============================================================================
// Tests
// ============================================================================
