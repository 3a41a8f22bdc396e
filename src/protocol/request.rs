//! Outbound request envelope and the envelope coder.
//!
//! [`RpcCoder`] owns the id counter of one logical connection. Ids start at
//! 0 and are reset whenever a new connection epoch begins.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::{Envelope, ResultType, RpcError};

// ============================================================================
// Request
// ============================================================================

/// A JSON-RPC 2.0 request.
///
/// # Format
///
/// ```json
/// { "jsonrpc": "2.0", "id": 0, "method": "chain_getFinalizedHead", "params": [] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request<'a> {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: &'static str,

    /// Correlation id.
    pub id: RequestId,

    /// Method name.
    pub method: &'a str,

    /// Positional parameters.
    pub params: &'a [Value],
}

impl<'a> Request<'a> {
    /// Protocol version tag.
    pub const VERSION: &'static str = "2.0";

    /// Creates a request.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, method: &'a str, params: &'a [Value]) -> Self {
        Self {
            jsonrpc: Self::VERSION,
            id,
            method,
            params,
        }
    }
}

// ============================================================================
// RpcCoder
// ============================================================================

/// Id allocator and envelope codec.
///
/// # Thread Safety
///
/// The counter is atomic; `RpcCoder` can be shared across tasks.
#[derive(Debug, Default)]
pub struct RpcCoder {
    next_id: AtomicU64,
}

impl RpcCoder {
    /// Creates a coder whose first id is 0.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next request id.
    #[inline]
    pub fn next_id(&self) -> RequestId {
        RequestId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Resets the counter so the next id is 0.
    #[inline]
    pub fn reset_id(&self) {
        self.next_id.store(0, Ordering::Relaxed);
    }

    /// Returns the id the next call to [`next_id`](Self::next_id) yields.
    #[inline]
    #[must_use]
    pub fn peek_id(&self) -> RequestId {
        RequestId::new(self.next_id.load(Ordering::Relaxed))
    }

    /// Encodes a request envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a parameter cannot be serialized.
    pub fn encode(&self, id: RequestId, method: &str, params: &[Value]) -> Result<String> {
        Ok(serde_json::to_string(&Request::new(id, method, params))?)
    }

    /// Decodes a single response expected to answer request `id`.
    ///
    /// Used by transports that carry exactly one request per exchange.
    ///
    /// # Errors
    ///
    /// - [`Error::Rpc`] with the server's error object on an error envelope
    /// - [`Error::Rpc`] with code `-32603` if the text is not a response to `id`
    /// - whatever `result` returns while decoding the payload
    pub fn decode<T: 'static>(&self, id: RequestId, text: &str, result: &ResultType<T>) -> Result<T> {
        match Envelope::parse(text) {
            Ok(Envelope::Response {
                id: got,
                outcome,
            }) if got == id => match outcome {
                Ok(raw) => result.decode(raw),
                Err(error) => Err(Error::Rpc(error)),
            },
            Ok(Envelope::Response { id: got, .. }) => Err(Error::rpc(
                RpcError::INTERNAL_ERROR,
                format!("response id {got} does not match request id {id}"),
                None,
            )),
            Ok(Envelope::Notification { .. }) => Err(Error::rpc(
                RpcError::INTERNAL_ERROR,
                "expected a response, got a notification",
                None,
            )),
            Err(e) => Err(Error::rpc(
                RpcError::INTERNAL_ERROR,
                "invalid response envelope",
                Some(e.to_string()),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::types::Hash256;

    #[test]
    fn test_ids_start_at_zero() {
        let coder = RpcCoder::new();
        assert_eq!(coder.next_id(), RequestId::new(0));
        assert_eq!(coder.next_id(), RequestId::new(1));
        assert_eq!(coder.peek_id(), RequestId::new(2));
    }

    #[test]
    fn test_reset_id() {
        let coder = RpcCoder::new();
        coder.next_id();
        coder.next_id();
        coder.reset_id();
        assert_eq!(coder.next_id(), RequestId::new(0));
    }

    #[test]
    fn test_encode_envelope() {
        let coder = RpcCoder::new();
        let id = coder.next_id();
        let text = coder
            .encode(id, "chain_getBlockHash", &[json!(5)])
            .expect("encode");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(
            value,
            json!({ "jsonrpc": "2.0", "id": 0, "method": "chain_getBlockHash", "params": [5] })
        );
    }

    #[test]
    fn test_encode_empty_params() {
        let text = RpcCoder::new()
            .encode(RequestId::new(3), "system_health", &[])
            .expect("encode");
        assert!(text.contains(r#""params":[]"#));
    }

    #[test]
    fn test_decode_success() {
        let coder = RpcCoder::new();
        let text = format!(r#"{{"jsonrpc":"2.0","result":"0x{}","id":0}}"#, "ab".repeat(32));
        let hash = coder
            .decode(RequestId::new(0), &text, &ResultType::<Hash256>::json())
            .expect("decode");
        assert_eq!(hash, Hash256::new([0xab; 32]));
    }

    #[test]
    fn test_decode_error_envelope() {
        let coder = RpcCoder::new();
        let text = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":0}"#;
        let err = coder
            .decode(RequestId::new(0), text, &ResultType::<Value>::json())
            .expect_err("rpc error");
        assert!(matches!(err, Error::Rpc(ref e) if e.code == -32601));
    }

    #[test]
    fn test_decode_id_mismatch() {
        let coder = RpcCoder::new();
        let err = coder
            .decode(RequestId::new(1), r#"{"result":1,"id":2}"#, &ResultType::<u64>::json())
            .expect_err("mismatch");
        assert!(matches!(err, Error::Rpc(ref e) if e.code == RpcError::INTERNAL_ERROR));
    }

    #[test]
    fn test_decode_invalid_json() {
        let coder = RpcCoder::new();
        let err = coder
            .decode(RequestId::new(0), "<html>", &ResultType::<u64>::json())
            .expect_err("invalid");
        assert!(matches!(err, Error::Rpc(ref e) if e.code == -32603 && e.data.is_some()));
    }
}
