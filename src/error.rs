//! Error types for the SCALE codec and RPC client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use dotwire::{Client, Result};
//! use dotwire::protocol::StandardCommands;
//!
//! async fn example(client: &Client) -> Result<()> {
//!     let head = client.execute(StandardCommands::finalized_head()).await?;
//!     println!("finalized: {head}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Codec | [`Error::Encoding`], [`Error::MalformedInput`], [`Error::UnknownVariant`] |
//! | RPC | [`Error::Rpc`], [`Error::Transport`] |
//! | Connection | [`Error::ConnectionReset`], [`Error::ConnectionClosed`], [`Error::NotConnected`], [`Error::ConnectionTimeout`] |
//! | Configuration | [`Error::Config`] |
//! | External | [`Error::Json`], [`Error::WebSocket`], [`Error::Hex`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::protocol::RpcError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Codec variants are raised synchronously by readers and writers.
/// Connection and RPC variants are delivered through a call's
/// [`ResponseFuture`](crate::client::ResponseFuture).
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Value cannot be represented in the target wire type.
    ///
    /// Returned when writing e.g. a negative number into an unsigned writer.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Description of the unrepresentable value.
        message: String,
    },

    /// Input bytes do not form a valid value.
    ///
    /// Returned on short reads, invalid boolean bytes and similar.
    #[error("Malformed input: {message}")]
    MalformedInput {
        /// Description of the decoding failure.
        message: String,
    },

    /// Tagged union index outside the declared variants.
    #[error("Unknown variant index {index} (declared variants: {variants})")]
    UnknownVariant {
        /// Tag read from the stream.
        index: u8,
        /// Number of declared variants.
        variants: usize,
    },

    // ========================================================================
    // RPC Errors
    // ========================================================================
    /// Server answered with an error envelope.
    #[error("RPC error: {0}")]
    Rpc(RpcError),

    /// Transport failed while the call was in flight.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Pending call invalidated because the client reconnected.
    #[error("Connection reset")]
    ConnectionReset,

    /// Pending call invalidated because the connection closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Call submitted while the client is not connected.
    #[error("Not connected")]
    NotConnected,

    /// WebSocket handshake did not complete in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Hex decoding error.
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Endpoint URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Conversions
// ============================================================================

impl From<RpcError> for Error {
    #[inline]
    fn from(err: RpcError) -> Self {
        Self::Rpc(err)
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an encoding error.
    #[inline]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a malformed input error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Creates an unknown variant error.
    #[inline]
    pub fn unknown_variant(index: u8, variants: usize) -> Self {
        Self::UnknownVariant { index, variants }
    }

    /// Creates an RPC error from its envelope fields.
    #[inline]
    pub fn rpc(code: i64, message: impl Into<String>, data: Option<String>) -> Self {
        Self::Rpc(RpcError::new(code, message, data))
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error came from the binary codec.
    #[inline]
    #[must_use]
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::Encoding { .. } | Self::MalformedInput { .. } | Self::UnknownVariant { .. }
        )
    }

    /// Returns `true` if the server answered with an error envelope.
    #[inline]
    #[must_use]
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::ConnectionReset
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::ConnectionTimeout { .. }
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed after reconnecting and retrying.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionReset
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::ConnectionTimeout { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("need 2 bytes, have 1");
        assert_eq!(err.to_string(), "Malformed input: need 2 bytes, have 1");
    }

    #[test]
    fn test_unknown_variant_display() {
        let err = Error::unknown_variant(5, 3);
        assert_eq!(
            err.to_string(),
            "Unknown variant index 5 (declared variants: 3)"
        );
    }

    #[test]
    fn test_rpc_error_display() {
        let err = Error::rpc(-32601, "Method not found", None);
        assert_eq!(err.to_string(), "RPC error: -32601: Method not found");
    }

    #[test]
    fn test_is_codec_error() {
        assert!(Error::encoding("negative").is_codec_error());
        assert!(Error::unknown_variant(1, 1).is_codec_error());
        assert!(!Error::ConnectionClosed.is_codec_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::ConnectionReset.is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::transport("gone").is_connection_error());
        assert!(!Error::config("test").is_connection_error());
        assert!(!Error::rpc(1, "x", None).is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::ConnectionReset.is_recoverable());
        assert!(Error::connection_timeout(1000).is_recoverable());
        assert!(!Error::malformed("x").is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_rpc_error() {
        let err: Error = RpcError::new(-1, "boom", Some("detail".into())).into();
        assert!(err.is_rpc_error());
    }
}
