//! dotwire - SCALE codec and multiplexed WebSocket RPC client for
//! Substrate-style nodes.
//!
//! This library provides the binary codec used by such chains and a client
//! that multiplexes JSON-RPC calls and subscriptions over one WebSocket.
//!
//! # Architecture
//!
//! The client follows a single-socket model:
//!
//! - **Callers**: Submit calls from any task, await a [`ResponseFuture`]
//! - **Dispatch loop**: Owns the socket, routes responses and events
//!
//! Key design principles:
//!
//! - Each [`Client`] owns one logical connection; every reconnect starts a
//!   new epoch with its own request ids and registries
//! - Responses are correlated by id, never by order
//! - Notifications go to the subscription registered under their id
//! - Inbound messages are processed one at a time, in arrival order
//!
//! # Quick Start
//!
//! ```no_run
//! use dotwire::{Client, Result};
//! use dotwire::protocol::{StandardCommands, StandardSubscriptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .url("ws://127.0.0.1:9944")
//!         .connect()
//!         .await?;
//!
//!     let head = client.execute(StandardCommands::finalized_head()).await?;
//!     println!("finalized head: {head}");
//!
//!     let heads = client.subscribe(StandardSubscriptions::new_heads()).await?;
//!     heads.set_handler(|event| println!("block #{}", event.value.number));
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`], builder, options, subscriptions |
//! | [`codec`] | SCALE readers and writers |
//! | [`crypto`] | Signing and address collaborator traits |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | JSON-RPC envelopes and call descriptors |
//! | [`transport`] | WebSocket connection and registries (internal) |
//! | [`types`] | Hashes, byte strings and chain records |

// ============================================================================
// Modules
// ============================================================================

/// Node client.
///
/// Use [`Client::builder()`] to create a configured client instance.
pub mod client;

/// SCALE binary codec.
pub mod codec;

/// Signing and address collaborators.
pub mod crypto;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for requests, subscriptions and epochs.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// JSON-RPC message types.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module handling the socket, the size gate and registries.
pub mod transport;

/// Chain data types.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    Client, ClientBuilder, ClientOptions, ConnectionState, ResponseFuture, Subscription,
    SubscriptionEvent,
};

// Codec types
pub use codec::{ScaleCodecReader, ScaleCodecWriter, ScaleReader, ScaleWriter};

// Collaborator traits
pub use crypto::{AddressCodec, Signer};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{Epoch, RequestId, SubscriptionId};

// Protocol types
pub use protocol::{ResultType, RpcCall, RpcError, SubscribeCall};

// Chain types
pub use types::{ByteData, Hash256, Hash512};
