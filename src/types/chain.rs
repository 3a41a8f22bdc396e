//! JSON records returned by standard node RPC methods.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use super::{ByteData, Hash256};

// ============================================================================
// Hex Numbers
// ============================================================================

/// Serde adapter for numbers carried as `0x`-prefixed hex strings.
pub mod hex_number {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::{Serialize, Serializer};

    /// Serializes `value` as `0x`-prefixed lowercase hex.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        format!("{value:#x}").serialize(serializer)
    }

    /// Deserializes a hex string (prefix optional) or a plain JSON number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Ok(n),
            Repr::Str(s) => {
                let digits = s.strip_prefix("0x").unwrap_or(&s);
                u64::from_str_radix(digits, 16).map_err(de::Error::custom)
            }
        }
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// Response of `chain_getBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResponse {
    /// The block itself.
    pub block: Block,
    /// Finality justification, when present.
    #[serde(default)]
    pub justification: Option<ByteData>,
}

/// Block header plus encoded extrinsics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: Header,
    /// SCALE-encoded extrinsics.
    #[serde(default)]
    pub extrinsics: Vec<ByteData>,
}

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Hash of the parent block.
    pub parent_hash: Hash256,
    /// Block height.
    #[serde(with = "hex_number")]
    pub number: u64,
    /// State trie root after this block.
    pub state_root: Hash256,
    /// Extrinsics trie root.
    pub extrinsics_root: Hash256,
    /// Consensus digest.
    #[serde(default)]
    pub digest: Digest,
}

/// Header digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// SCALE-encoded digest items.
    #[serde(default)]
    pub logs: Vec<ByteData>,
}

// ============================================================================
// System
// ============================================================================

/// Response of `system_health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    /// Whether the node is syncing.
    pub is_syncing: bool,
    /// Connected peer count.
    pub peers: u32,
    /// Whether the node expects to have peers.
    pub should_have_peers: bool,
}

/// Response of `rpc_methods`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Methods {
    /// Interface version.
    #[serde(default)]
    pub version: u32,
    /// Available method names.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Response of `state_getRuntimeVersion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
    /// Chain spec name, e.g. `polkadot`.
    pub spec_name: String,
    /// Implementation name.
    pub impl_name: String,
    /// Authoring version.
    pub authoring_version: u32,
    /// Spec version.
    pub spec_version: u32,
    /// Implementation version.
    pub impl_version: u32,
    /// Transaction format version.
    #[serde(default)]
    pub transaction_version: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_header_parsing() {
        let json = format!(
            r#"{{
                "parentHash": "{ZERO}",
                "number": "0x1a2b",
                "stateRoot": "{ZERO}",
                "extrinsicsRoot": "{ZERO}",
                "digest": {{ "logs": ["0x0601"] }}
            }}"#
        );
        let header: Header = serde_json::from_str(&json).expect("parse");
        assert_eq!(header.number, 0x1a2b);
        assert_eq!(header.digest.logs.len(), 1);

        let back = serde_json::to_value(&header).expect("serialize");
        assert_eq!(back["number"], "0x1a2b");
    }

    #[test]
    fn test_header_numeric_number() {
        let json = format!(
            r#"{{"parentHash":"{ZERO}","number":7,"stateRoot":"{ZERO}","extrinsicsRoot":"{ZERO}"}}"#
        );
        let header: Header = serde_json::from_str(&json).expect("parse");
        assert_eq!(header.number, 7);
        assert!(header.digest.logs.is_empty());
    }

    #[test]
    fn test_system_health() {
        let health: SystemHealth =
            serde_json::from_str(r#"{"isSyncing":false,"peers":12,"shouldHavePeers":true}"#)
                .expect("parse");
        assert_eq!(health.peers, 12);
        assert!(!health.is_syncing);
        assert!(health.should_have_peers);
    }

    #[test]
    fn test_runtime_version() {
        let json = r#"{
            "specName": "polkadot",
            "implName": "parity-polkadot",
            "authoringVersion": 0,
            "specVersion": 9430,
            "implVersion": 0,
            "apis": [],
            "transactionVersion": 24
        }"#;
        let version: RuntimeVersion = serde_json::from_str(json).expect("parse");
        assert_eq!(version.spec_name, "polkadot");
        assert_eq!(version.spec_version, 9430);
        assert_eq!(version.transaction_version, 24);
    }
}
