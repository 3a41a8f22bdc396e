//! Chain data types.
//!
//! | Type | SCALE form | JSON form |
//! |------|------------|-----------|
//! | [`Hash256`] | 32 raw bytes | `0x` hex |
//! | [`Hash512`] | 64 raw bytes | `0x` hex |
//! | [`ByteData`] | opaque | `0x` hex |
//! | [`Header`], [`Block`], [`SystemHealth`], ... | - | JSON objects |

// ============================================================================
// Submodules
// ============================================================================

/// Variable-length byte strings.
pub mod bytes;

/// JSON records of standard RPC methods.
pub mod chain;

/// Fixed-size hashes.
pub mod hash;

// ============================================================================
// Re-exports
// ============================================================================

pub use bytes::ByteData;
pub use chain::{Block, BlockResponse, Digest, Header, Methods, RuntimeVersion, SystemHealth};
pub use hash::{Hash256, Hash256Reader, Hash256Writer, Hash512, Hash512Reader, Hash512Writer};
