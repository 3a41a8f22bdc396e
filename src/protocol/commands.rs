//! Standard node calls and subscriptions.
//!
//! | Namespace | Method | Result |
//! |-----------|--------|--------|
//! | `chain` | `chain_getFinalizedHead` | [`Hash256`] |
//! | `chain` | `chain_getBlock` | `Option<`[`BlockResponse`]`>` |
//! | `chain` | `chain_getBlockHash` | `Option<`[`Hash256`]`>` |
//! | `chain` | `chain_getHeader` | `Option<`[`Header`]`>` |
//! | `rpc` | `rpc_methods` | [`Methods`] |
//! | `system` | `system_chain`, `system_name`, `system_version` | `String` |
//! | `system` | `system_health` | [`SystemHealth`] |
//! | `system` | `system_nodeRoles` | `Vec<String>` |
//! | `state` | `state_getMetadata` | [`ByteData`] |
//! | `state` | `state_getRuntimeVersion` | [`RuntimeVersion`] |
//! | `state` | `state_getStorage` | `Option<`[`ByteData`]`>` |

// ============================================================================
// Imports
// ============================================================================

use crate::types::{BlockResponse, ByteData, Hash256, Header, Methods, RuntimeVersion, SystemHealth};

use super::{ResultType, RpcCall, SubscribeCall};

// ============================================================================
// StandardCommands
// ============================================================================

/// Builders for standard request/response calls.
///
/// Optional `at` block hashes default to the best block on the node side.
#[derive(Debug, Clone, Copy)]
pub struct StandardCommands;

impl StandardCommands {
    /// `chain_getFinalizedHead`: hash of the last finalized block.
    #[must_use]
    pub fn finalized_head() -> RpcCall<Hash256> {
        RpcCall::new("chain_getFinalizedHead", ResultType::json())
    }

    /// `chain_getBlock`: full block, `None` if unknown.
    #[must_use]
    pub fn block(hash: Option<Hash256>) -> RpcCall<Option<BlockResponse>> {
        RpcCall::new("chain_getBlock", ResultType::json()).param_opt(hash.map(|h| h.to_hex()))
    }

    /// `chain_getBlockHash`: hash of block `number`, or of the best block.
    #[must_use]
    pub fn block_hash(number: Option<u64>) -> RpcCall<Option<Hash256>> {
        RpcCall::new("chain_getBlockHash", ResultType::json()).param_opt(number)
    }

    /// `chain_getHeader`: header of a block, or of the best block.
    #[must_use]
    pub fn header(hash: Option<Hash256>) -> RpcCall<Option<Header>> {
        RpcCall::new("chain_getHeader", ResultType::json()).param_opt(hash.map(|h| h.to_hex()))
    }

    /// `rpc_methods`: methods the node exposes.
    #[must_use]
    pub fn methods() -> RpcCall<Methods> {
        RpcCall::new("rpc_methods", ResultType::json())
    }

    /// `system_chain`: chain name.
    #[must_use]
    pub fn system_chain() -> RpcCall<String> {
        RpcCall::new("system_chain", ResultType::json())
    }

    /// `system_name`: node implementation name.
    #[must_use]
    pub fn system_name() -> RpcCall<String> {
        RpcCall::new("system_name", ResultType::json())
    }

    /// `system_version`: node implementation version.
    #[must_use]
    pub fn system_version() -> RpcCall<String> {
        RpcCall::new("system_version", ResultType::json())
    }

    /// `system_health`: sync and peer status.
    #[must_use]
    pub fn system_health() -> RpcCall<SystemHealth> {
        RpcCall::new("system_health", ResultType::json())
    }

    /// `system_nodeRoles`: roles of the node, e.g. `Full`.
    #[must_use]
    pub fn node_roles() -> RpcCall<Vec<String>> {
        RpcCall::new("system_nodeRoles", ResultType::json())
    }

    /// `state_getMetadata`: encoded runtime metadata.
    #[must_use]
    pub fn metadata(at: Option<Hash256>) -> RpcCall<ByteData> {
        RpcCall::new("state_getMetadata", ResultType::json()).param_opt(at.map(|h| h.to_hex()))
    }

    /// `state_getRuntimeVersion`: runtime version.
    #[must_use]
    pub fn runtime_version(at: Option<Hash256>) -> RpcCall<RuntimeVersion> {
        RpcCall::new("state_getRuntimeVersion", ResultType::json())
            .param_opt(at.map(|h| h.to_hex()))
    }

    /// `state_getStorage`: raw storage value under `key`, `None` if empty.
    #[must_use]
    pub fn storage(key: &[u8], at: Option<Hash256>) -> RpcCall<Option<ByteData>> {
        RpcCall::new("state_getStorage", ResultType::json())
            .param(ByteData::from(key).to_hex())
            .param_opt(at.map(|h| h.to_hex()))
    }
}

// ============================================================================
// StandardSubscriptions
// ============================================================================

/// Builders for standard subscriptions.
#[derive(Debug, Clone, Copy)]
pub struct StandardSubscriptions;

impl StandardSubscriptions {
    /// New best-block headers.
    #[must_use]
    pub fn new_heads() -> SubscribeCall<Header> {
        SubscribeCall::new(
            "chain_subscribeNewHead",
            "chain_unsubscribeNewHead",
            ResultType::json(),
        )
    }

    /// New finalized headers.
    #[must_use]
    pub fn finalized_heads() -> SubscribeCall<Header> {
        SubscribeCall::new(
            "chain_subscribeFinalizedHeads",
            "chain_unsubscribeFinalizedHeads",
            ResultType::json(),
        )
    }

    /// Runtime upgrades.
    #[must_use]
    pub fn runtime_version() -> SubscribeCall<RuntimeVersion> {
        SubscribeCall::new(
            "state_subscribeRuntimeVersion",
            "state_unsubscribeRuntimeVersion",
            ResultType::json(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    #[test]
    fn test_finalized_head() {
        let call = StandardCommands::finalized_head();
        assert_eq!(call.method(), "chain_getFinalizedHead");
        assert!(call.params().is_empty());
    }

    #[test]
    fn test_optional_params_omitted() {
        assert!(StandardCommands::block(None).params().is_empty());
        assert!(StandardCommands::block_hash(None).params().is_empty());
        assert_eq!(StandardCommands::block_hash(Some(42)).params(), &[json!(42)]);
    }

    #[test]
    fn test_hash_param_is_hex() {
        let hash = Hash256::new([0x01; 32]);
        let call = StandardCommands::header(Some(hash));
        assert_eq!(call.params(), &[Value::String(hash.to_hex())]);
    }

    #[test]
    fn test_storage_key() {
        let call = StandardCommands::storage(&[0x26, 0xaa], None);
        assert_eq!(call.method(), "state_getStorage");
        assert_eq!(call.params(), &[json!("0x26aa")]);
    }

    #[test]
    fn test_storage_result_decodes() {
        let call = StandardCommands::storage(&[0x00], None);
        assert_eq!(call.result_type().decode("null").expect("null"), None);
        let value = call.result_type().decode("\"0x0102\"").expect("bytes");
        assert_eq!(value.as_deref(), Some(&[0x01, 0x02][..]));
    }

    #[test]
    fn test_subscriptions() {
        let sub = StandardSubscriptions::finalized_heads();
        assert_eq!(sub.method(), "chain_subscribeFinalizedHeads");
        assert_eq!(sub.unsubscribe_method(), "chain_unsubscribeFinalizedHeads");
        assert_eq!(
            StandardSubscriptions::runtime_version().unsubscribe_method(),
            "state_unsubscribeRuntimeVersion"
        );
    }
}
