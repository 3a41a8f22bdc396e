//! Client connection options.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use dotwire::ClientOptions;
//!
//! let options = ClientOptions::new()
//!     .with_connect_timeout(Duration::from_secs(10))
//!     .without_keepalive();
//!
//! assert!(options.keepalive.is_none());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::transport::connection::DEFAULT_MAX_MESSAGE_SIZE;
use crate::transport::{ConnectionConfig, KeepAlive};

// ============================================================================
// Constants
// ============================================================================

/// Default WebSocket handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Types
// ============================================================================

/// Callback invoked once when the client is closed.
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;

// ============================================================================
// ClientOptions
// ============================================================================

/// Connection settings of a [`Client`](super::Client).
#[derive(Clone)]
pub struct ClientOptions {
    /// Maximum time for the WebSocket handshake.
    pub connect_timeout: Duration,

    /// Keepalive schedule, `None` to disable pings.
    pub keepalive: Option<KeepAlive>,

    /// Limit for one reassembled inbound message in bytes.
    pub max_message_size: usize,

    /// Invoked once when [`Client::close`](super::Client::close) completes.
    pub on_close: Option<CloseCallback>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keepalive: Some(KeepAlive::default()),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            on_close: None,
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("connect_timeout", &self.connect_timeout)
            .field("keepalive", &self.keepalive)
            .field("max_message_size", &self.max_message_size)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handshake timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the keepalive schedule.
    #[inline]
    #[must_use]
    pub fn with_keepalive(mut self, delay: Duration, period: Duration) -> Self {
        self.keepalive = Some(KeepAlive { delay, period });
        self
    }

    /// Disables keepalive pings.
    #[inline]
    #[must_use]
    pub fn without_keepalive(mut self) -> Self {
        self.keepalive = None;
        self
    }

    /// Sets the inbound message size limit.
    #[inline]
    #[must_use]
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    /// Sets the close callback.
    #[inline]
    #[must_use]
    pub fn with_on_close(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(callback));
        self
    }

    /// Returns the per-connection settings.
    #[inline]
    #[must_use]
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            keepalive: self.keepalive,
            max_message_size: self.max_message_size,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
