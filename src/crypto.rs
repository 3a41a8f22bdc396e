//! Signing and address collaborators.
//!
//! The client never signs or formats addresses itself. Applications plug
//! in a provider through these traits.

use crate::error::Result;

// ============================================================================
// Signer
// ============================================================================

/// Asymmetric signature provider.
pub trait Signer {
    /// Key material used to sign.
    type Keypair;

    /// Signs `message` and returns the raw signature.
    ///
    /// # Errors
    ///
    /// Provider-specific failures, e.g. an unusable keypair.
    fn sign(&self, message: &[u8], keypair: &Self::Keypair) -> Result<Vec<u8>>;

    /// Returns `true` if `signature` is valid for `message` under `public_key`.
    fn verify(&self, signature: &[u8], message: &[u8], public_key: &[u8]) -> bool;
}

// ============================================================================
// AddressCodec
// ============================================================================

/// Human-readable address format.
pub trait AddressCodec {
    /// Encodes a public key for the given network.
    fn encode(&self, network: u8, public_key: &[u8]) -> String;

    /// Decodes an address into its network tag and public key.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`](crate::Error::MalformedInput) if the
    /// address is invalid or its checksum does not match.
    fn decode(&self, address: &str) -> Result<(u8, Vec<u8>)>;
}

// ============================================================================
// Tests
// ============================================================================
