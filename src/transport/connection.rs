//! WebSocket connection and dispatch loop.
//!
//! One [`Connection`] wraps exactly one socket, i.e. one connection epoch.
//! Reconnecting creates a new `Connection` with empty registries and shuts
//! the old one down with [`CloseReason::Reset`].
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Outgoing requests from the client API
//! - Incoming messages, checked against the size limit
//! - Response correlation by request id
//! - Subscription event dispatch by subscription id
//! - Keepalive pings
//!
//! Inbound messages are processed strictly one at a time in arrival order.
//! A message that cannot be routed or decoded is logged and dropped; it
//! never ends the loop.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{Epoch, RequestId};
use crate::protocol::Envelope;

use super::{MessageBuffer, PendingRequest, PendingRegistry, SubscriptionRegistry};

// ============================================================================
// Constants
// ============================================================================

/// Default delay before the first keepalive ping.
pub const DEFAULT_KEEPALIVE_DELAY: Duration = Duration::from_secs(30);

/// Default period between keepalive pings.
pub const DEFAULT_KEEPALIVE_PERIOD: Duration = Duration::from_secs(45);

/// Default limit for one reassembled message (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 << 20;

// ============================================================================
// Configuration
// ============================================================================

/// Keepalive schedule: first ping after `delay`, then every `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    /// Delay before the first ping.
    pub delay: Duration,
    /// Period between subsequent pings.
    pub period: Duration,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self {
            delay: DEFAULT_KEEPALIVE_DELAY,
            period: DEFAULT_KEEPALIVE_PERIOD,
        }
    }
}

/// Per-connection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Keepalive schedule, `None` to disable pings.
    pub keepalive: Option<KeepAlive>,
    /// Limit for one reassembled message.
    pub max_message_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            keepalive: Some(KeepAlive::default()),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

// ============================================================================
// CloseReason
// ============================================================================

/// Why a connection ended; decides how its pending requests fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Replaced by a newer epoch. Pending requests fail with
    /// [`Error::ConnectionReset`].
    Reset,
    /// Closed by either side. Pending requests fail with
    /// [`Error::ConnectionClosed`].
    Closed,
    /// Socket error. Pending requests fail with [`Error::Transport`].
    Failed(String),
}

impl CloseReason {
    /// Returns the error delivered to pending requests.
    #[must_use]
    pub fn to_error(&self) -> Error {
        match self {
            Self::Reset => Error::ConnectionReset,
            Self::Closed => Error::ConnectionClosed,
            Self::Failed(message) => Error::transport(message.clone()),
        }
    }
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Register a request and send its encoded envelope.
    Send {
        id: RequestId,
        payload: String,
        request: PendingRequest,
    },
    /// Close the socket and end the loop.
    Shutdown(CloseReason),
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to one WebSocket connection epoch.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and cheap to clone. All operations are
/// non-blocking; results arrive through each request's completer.
#[derive(Clone)]
pub struct Connection {
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    shared: Arc<Shared>,
}

/// State shared between connection handles and the event loop.
///
/// Holds no command sender, so the loop sees the channel close once every
/// handle is dropped.
struct Shared {
    epoch: Epoch,
    pending: PendingRegistry,
    subscriptions: SubscriptionRegistry,
    closed: AtomicBool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("epoch", &self.shared.epoch)
            .field("pending", &self.shared.pending.len())
            .field("subscriptions", &self.shared.subscriptions.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Connection {
    /// Connects to `url` and spawns the event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake exceeds `connect_timeout`
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn open(
        url: &Url,
        connect_timeout: Duration,
        epoch: Epoch,
        config: ConnectionConfig,
    ) -> Result<(Self, JoinHandle<()>)> {
        debug!(%url, %epoch, "Connecting");

        let connecting = connect_async_with_config(url.as_str(), Some(socket_config()), false);
        let (ws_stream, _response) = timeout(connect_timeout, connecting)
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))??;

        Ok(Self::spawn::<MaybeTlsStream<TcpStream>>(ws_stream, epoch, config))
    }

    /// Wraps an established WebSocket stream and spawns the event loop.
    pub fn spawn<S>(
        ws_stream: WebSocketStream<S>,
        epoch: Epoch,
        config: ConnectionConfig,
    ) -> (Self, JoinHandle<()>)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            epoch,
            pending: PendingRegistry::new(),
            subscriptions: SubscriptionRegistry::new(),
            closed: AtomicBool::new(false),
        });

        let task = tokio::spawn(Shared::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&shared),
            config,
        ));
        let connection = Self { command_tx, shared };

        debug!(%epoch, "Connection epoch started");
        (connection, task)
    }

    /// Queues a request for sending.
    ///
    /// The request is registered by the loop just before its envelope is
    /// written. If the loop has ended, the request is completed with
    /// [`Error::ConnectionClosed`] immediately.
    pub fn send(&self, id: RequestId, payload: String, request: PendingRequest) {
        let command = ConnectionCommand::Send {
            id,
            payload,
            request,
        };
        if let Err(mpsc::error::SendError(command)) = self.command_tx.send(command)
            && let ConnectionCommand::Send { request, .. } = command
        {
            request.complete(Err(Error::ConnectionClosed), &self.shared.subscriptions);
        }
    }

    /// Asks the loop to close the socket.
    ///
    /// Pending requests are failed according to `reason` and subscriptions
    /// are dropped without unsubscribe calls.
    pub fn shutdown(&self, reason: CloseReason) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown(reason));
    }

    /// Returns the epoch of this connection.
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.shared.epoch
    }

    /// Returns `true` once the event loop has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Returns the pending-request registry.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &PendingRegistry {
        &self.shared.pending
    }

    /// Returns the subscription registry.
    #[inline]
    #[must_use]
    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.shared.subscriptions
    }
}

// ============================================================================
// Event Loop
// ============================================================================

impl Shared {
    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop<S>(
        ws_stream: WebSocketStream<S>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        shared: Arc<Shared>,
        config: ConnectionConfig,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let epoch = shared.epoch;
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let mut buffer = MessageBuffer::new(config.max_message_size);
        let mut keepalive = config.keepalive.map(|k| {
            let mut interval = interval_at(Instant::now() + k.delay, k.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        let reason = loop {
            tokio::select! {
                // Incoming frames from the node
                message = ws_read.next() => {
                    match message {
                        // Continuation frames are joined by tungstenite
                        Some(Ok(Message::Text(text))) => {
                            shared.handle_message(&mut buffer, text.as_bytes());
                        }

                        Some(Ok(Message::Binary(data))) => {
                            shared.handle_message(&mut buffer, &data);
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(%epoch, ?frame, "WebSocket closed by remote");
                            break CloseReason::Closed;
                        }

                        // Pongs to server pings are queued by tungstenite;
                        // raw frames are never yielded on read
                        Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                            trace!(%epoch, "Control frame");
                        }

                        Some(Err(e)) => {
                            warn!(%epoch, error = %e, "WebSocket error");
                            break CloseReason::Failed(e.to_string());
                        }

                        None => {
                            debug!(%epoch, "WebSocket stream ended");
                            break CloseReason::Closed;
                        }
                    }
                }

                // Keepalive timer
                () = next_tick(&mut keepalive) => {
                    trace!(%epoch, "Keepalive ping");
                    if let Err(e) = ws_write.send(Message::Ping(Default::default())).await {
                        warn!(%epoch, error = %e, "Keepalive ping failed");
                        break CloseReason::Failed(e.to_string());
                    }
                }

                // Commands from the client API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { id, payload, request }) => {
                            shared.handle_send(id, payload, request, &mut ws_write).await;
                        }

                        Some(ConnectionCommand::Shutdown(reason)) => {
                            debug!(%epoch, ?reason, "Shutdown command received");
                            let close = Message::Close(Some(CloseFrame {
                                code: CloseCode::Normal,
                                reason: "".into(),
                            }));
                            if let Err(e) = ws_write.send(close).await {
                                debug!(%epoch, error = %e, "Close frame not sent");
                            }
                            let _ = ws_write.close().await;
                            break reason;
                        }

                        None => {
                            debug!(%epoch, "Command channel closed");
                            let _ = ws_write.close().await;
                            break CloseReason::Closed;
                        }
                    }
                }
            }
        };

        shared.finish(&mut command_rx, &reason);
        debug!(%epoch, ?reason, "Event loop terminated");
    }

    /// Passes one whole message through the size gate and dispatches it.
    ///
    /// An oversized or non-UTF-8 message is dropped; the loop continues.
    fn handle_message(&self, buffer: &mut MessageBuffer, message: &[u8]) {
        match buffer.push(message, true) {
            Ok(Some(text)) => self.dispatch(&text),
            Ok(None) => {}
            Err(e) => warn!(epoch = %self.epoch, error = %e, "Dropping inbound message"),
        }
    }

    /// Routes one complete inbound message.
    fn dispatch(&self, text: &str) {
        let envelope = match Envelope::parse(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(epoch = %self.epoch, error = %e, "Dropping unroutable message");
                return;
            }
        };

        match envelope {
            Envelope::Response { id, outcome } => {
                let Some(request) = self.pending.remove(id) else {
                    debug!(epoch = %self.epoch, %id, "Response for unknown request");
                    return;
                };

                trace!(epoch = %self.epoch, %id, method = request.method(), "Response matched");
                let outcome = outcome.map_err(Error::Rpc);
                let subscriptions = &self.subscriptions;
                if catch_unwind(AssertUnwindSafe(|| request.complete(outcome, subscriptions))).is_err() {
                    warn!(epoch = %self.epoch, %id, "Response decoder panicked");
                }
            }

            Envelope::Notification {
                method,
                subscription,
                result,
            } => {
                let Some(dispatch) = self.subscriptions.dispatcher(&subscription) else {
                    debug!(epoch = %self.epoch, %subscription, %method, "Event for unknown subscription");
                    return;
                };

                match catch_unwind(AssertUnwindSafe(|| dispatch(&method, result))) {
                    Ok(Ok(())) => {
                        trace!(epoch = %self.epoch, %subscription, %method, "Event dispatched");
                    }
                    Ok(Err(e)) => {
                        warn!(epoch = %self.epoch, %subscription, error = %e, "Dropping undecodable event");
                    }
                    Err(_) => {
                        warn!(epoch = %self.epoch, %subscription, "Subscription handler panicked");
                    }
                }
            }
        }
    }

    /// Registers a request and writes its envelope.
    async fn handle_send<S>(
        &self,
        id: RequestId,
        payload: String,
        request: PendingRequest,
        ws_write: &mut SplitSink<WebSocketStream<S>, Message>,
    ) where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Store correlation before sending
        if let Err(request) = self.pending.insert(id, request) {
            request.complete(
                Err(Error::transport(format!("request id {id} already pending"))),
                &self.subscriptions,
            );
            return;
        }

        if let Err(e) = ws_write.send(Message::Text(payload.into())).await {
            if let Some(request) = self.pending.remove(id) {
                request.complete(Err(Error::transport(e.to_string())), &self.subscriptions);
            }
            return;
        }

        trace!(epoch = %self.epoch, %id, "Request sent");
    }

    /// Fails everything still outstanding once the loop has ended.
    fn finish(
        &self,
        command_rx: &mut mpsc::UnboundedReceiver<ConnectionCommand>,
        reason: &CloseReason,
    ) {
        self.closed.store(true, Ordering::Release);
        command_rx.close();

        let mut failed = self.pending.fail_all(|| reason.to_error(), &self.subscriptions);
        while let Ok(command) = command_rx.try_recv() {
            if let ConnectionCommand::Send { request, .. } = command {
                request.complete(Err(reason.to_error()), &self.subscriptions);
                failed += 1;
            }
        }

        let dropped = self.subscriptions.clear();
        if failed > 0 || dropped > 0 {
            debug!(epoch = %self.epoch, failed, dropped, "Released connection state");
        }
    }
}

/// Socket settings with tungstenite's size caps lifted.
///
/// Over-cap messages would otherwise surface as a read error and end the
/// loop; [`MessageBuffer`] applies the configured limit instead.
fn socket_config() -> WebSocketConfig {
    let mut config = WebSocketConfig::default();
    config.max_message_size = None;
    config.max_frame_size = None;
    config
}

/// Resolves on the next keepalive tick, or never when keepalive is off.
async fn next_tick(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
