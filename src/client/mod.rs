//! Node client module.
//!
//! This module provides the main entry point for talking to a node.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Multiplexed JSON-RPC client |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientOptions`] | Timeouts, keepalive and limits |
//! | [`ResponseFuture`] | Completion handle of one call |
//! | [`Subscription`] | Handle to a live subscription |
//!
//! # Example
//!
//! ```no_run
//! use dotwire::{Client, Result};
//! use dotwire::protocol::StandardCommands;
//!
//! # async fn example() -> Result<()> {
//! let client = Client::builder()
//!     .url("ws://127.0.0.1:9944")
//!     .connect()
//!     .await?;
//!
//! let chain = client.execute(StandardCommands::system_chain()).await?;
//! println!("connected to {chain}");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

/// Completion handle of a submitted call.
pub mod future;

/// Client connection options.
pub mod options;

/// Live subscription handle.
pub mod subscription;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::{Client, ConnectionState};
pub use future::ResponseFuture;
pub use options::{ClientOptions, CloseCallback, DEFAULT_CONNECT_TIMEOUT};
pub use subscription::{EventHandler, Subscription, SubscriptionEvent};
