//! JSON-RPC message types.
//!
//! This module defines the envelopes exchanged with the node and the
//! descriptors that tell the client how to decode each result.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Request`] | Client → Node | Method call |
//! | [`Envelope::Response`] | Node → Client | Result or error for one id |
//! | [`Envelope::Notification`] | Node → Client | Subscription event |
//!
//! # Method Naming
//!
//! Methods follow `namespace_methodName` format:
//!
//! - `chain_getFinalizedHead`
//! - `state_getStorage`
//! - `chain_subscribeNewHead`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `call` | Call and subscription descriptors |
//! | `commands` | Standard node calls and subscriptions |
//! | `request` | Request envelope and coder |
//! | `response` | Inbound envelope classification |

// ============================================================================
// Submodules
// ============================================================================

/// Call and subscription descriptors.
pub mod call;

/// Standard node calls and subscriptions.
pub mod commands;

/// Request envelope and coder.
pub mod request;

/// Inbound envelope classification.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use call::{ResultType, RpcCall, SubscribeCall};
pub use commands::{StandardCommands, StandardSubscriptions};
pub use request::{Request, RpcCoder};
pub use response::{Envelope, RpcError};
