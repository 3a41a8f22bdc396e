//! WebSocket transport layer.
//!
//! This module owns the socket side of the client: the inbound size gate,
//! the two registries, and the dispatch loop that routes messages between
//! them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Node           │
//! │                 │         WebSocket            │                 │
//! │  Connection     │◄────────────────────────────►│  JSON-RPC       │
//! │  (one epoch)    │      ws://host:9944          │  server         │
//! │                 │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::open` - WebSocket handshake, new epoch, loop spawned
//! 2. `Connection::send` - Requests registered and written by the loop
//! 3. Responses complete pending requests; events reach subscriptions
//! 4. `Connection::shutdown` - Close frame, pending failed, loop ends
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `buffer` | Size gate and fragment reassembly |
//! | `connection` | WebSocket connection and event loop |
//! | `registry` | Pending-request and subscription registries |

// ============================================================================
// Submodules
// ============================================================================

/// Size gate and fragment reassembly.
pub mod buffer;

/// WebSocket connection and event loop.
pub mod connection;

/// Pending-request and subscription registries.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use buffer::MessageBuffer;
pub use connection::{CloseReason, Connection, ConnectionConfig, KeepAlive};
pub use registry::{
    Completer, EventDispatch, PendingRegistry, PendingRequest, SubscriptionRegistry,
};
