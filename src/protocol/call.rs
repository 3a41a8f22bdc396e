//! Call descriptors.
//!
//! The JSON payload of a response is not self-describing, so every call
//! carries a [`ResultType`] that knows how to turn the raw `result` text
//! into the expected Rust type.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::{ScaleReader, extract};
use crate::error::Result;

// ============================================================================
// ResultType
// ============================================================================

type DecodeFn<T> = dyn Fn(&str) -> Result<T> + Send + Sync;

/// Decoder from raw JSON result text to `T`.
///
/// Carried alongside each pending request and subscription and invoked
/// once the id of an inbound message has been resolved.
pub struct ResultType<T> {
    decode: Arc<DecodeFn<T>>,
    kind: &'static str,
}

impl<T: DeserializeOwned + 'static> ResultType<T> {
    /// Decodes the result as JSON into `T` with serde.
    #[must_use]
    pub fn json() -> Self {
        Self {
            decode: Arc::new(|raw: &str| -> Result<T> { Ok(serde_json::from_str(raw)?) }),
            kind: "json",
        }
    }
}

impl<T: 'static> ResultType<T> {
    /// Decodes a hex string result with a SCALE reader.
    ///
    /// The result must be a JSON string such as `"0x0c616263"`.
    #[must_use]
    pub fn scale<R>(reader: R) -> Self
    where
        R: ScaleReader<T> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(move |raw: &str| {
                let hex_str: String = serde_json::from_str(raw)?;
                extract::from_hex(&reader, &hex_str)
            }),
            kind: "scale",
        }
    }

    /// Decodes with a caller-supplied function.
    #[must_use]
    pub fn custom<F>(decode: F) -> Self
    where
        F: Fn(&str) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
            kind: "custom",
        }
    }

    /// Decodes raw JSON text.
    ///
    /// # Errors
    ///
    /// Whatever the underlying decoder returns.
    #[inline]
    pub fn decode(&self, raw: &str) -> Result<T> {
        (self.decode)(raw)
    }
}

impl<T> Clone for ResultType<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
            kind: self.kind,
        }
    }
}

impl<T> fmt::Debug for ResultType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultType")
            .field("kind", &self.kind)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

// ============================================================================
// RpcCall
// ============================================================================

/// A request/response call.
///
/// # Example
///
/// ```
/// use dotwire::protocol::{ResultType, RpcCall};
///
/// let call: RpcCall<String> = RpcCall::new("system_chain", ResultType::json());
/// assert_eq!(call.method(), "system_chain");
/// ```
pub struct RpcCall<T> {
    method: String,
    params: Vec<Value>,
    result: ResultType<T>,
}

impl<T> RpcCall<T> {
    /// Creates a call without parameters.
    #[must_use]
    pub fn new(method: impl Into<String>, result: ResultType<T>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
            result,
        }
    }

    /// Appends a positional parameter.
    #[must_use]
    pub fn param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Appends a positional parameter when present.
    ///
    /// Trailing optional parameters are omitted rather than sent as `null`.
    #[must_use]
    pub fn param_opt(self, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.param(value),
            None => self,
        }
    }

    /// Returns the method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the positional parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Returns the result decoder.
    #[inline]
    #[must_use]
    pub fn result_type(&self) -> &ResultType<T> {
        &self.result
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Value>, ResultType<T>) {
        (self.method, self.params, self.result)
    }
}

impl<T> Clone for RpcCall<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            params: self.params.clone(),
            result: self.result.clone(),
        }
    }
}

impl<T> fmt::Debug for RpcCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcCall")
            .field("method", &self.method)
            .field("params", &self.params)
            .field("result", &self.result)
            .finish()
    }
}

// ============================================================================
// SubscribeCall
// ============================================================================

/// A call that opens a subscription.
///
/// The subscribe method returns a server-assigned id; subsequent
/// notifications carrying that id are decoded with the event type.
pub struct SubscribeCall<T> {
    method: String,
    unsubscribe: String,
    params: Vec<Value>,
    event: ResultType<T>,
}

impl<T> SubscribeCall<T> {
    /// Creates a subscribe call without parameters.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        unsubscribe: impl Into<String>,
        event: ResultType<T>,
    ) -> Self {
        Self {
            method: method.into(),
            unsubscribe: unsubscribe.into(),
            params: Vec::new(),
            event,
        }
    }

    /// Appends a positional parameter.
    #[must_use]
    pub fn param(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Returns the subscribe method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the unsubscribe method name.
    #[inline]
    #[must_use]
    pub fn unsubscribe_method(&self) -> &str {
        &self.unsubscribe
    }

    /// Returns the positional parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub(crate) fn into_parts(self) -> (String, String, Vec<Value>, ResultType<T>) {
        (self.method, self.unsubscribe, self.params, self.event)
    }
}

impl<T> Clone for SubscribeCall<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            unsubscribe: self.unsubscribe.clone(),
            params: self.params.clone(),
            event: self.event.clone(),
        }
    }
}

impl<T> fmt::Debug for SubscribeCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeCall")
            .field("method", &self.method)
            .field("unsubscribe", &self.unsubscribe)
            .field("params", &self.params)
            .field("event", &self.event)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::codec::StringReader;
    use crate::error::Error;
    use crate::types::Hash256;

    #[test]
    fn test_json_result() {
        let result = ResultType::<Option<Hash256>>::json();
        assert_eq!(result.decode("null").expect("null"), None);
        let hash = result
            .decode(&format!("\"0x{}\"", "11".repeat(32)))
            .expect("hash");
        assert_eq!(hash, Some(Hash256::new([0x11; 32])));
    }

    #[test]
    fn test_scale_result() {
        let result = ResultType::scale(StringReader);
        assert_eq!(result.decode("\"0x0c616263\"").expect("decode"), "abc");
        assert!(matches!(result.decode("12"), Err(Error::Json(_))));
        assert!(result.decode("\"0x08ff\"").is_err());
    }

    #[test]
    fn test_custom_result() {
        let result = ResultType::custom(|raw| Ok(raw.len()));
        assert_eq!(result.decode("[1,2]").expect("len"), 5);
    }

    #[test]
    fn test_call_params() {
        let call = RpcCall::new("chain_getBlockHash", ResultType::<Option<Hash256>>::json())
            .param(10u64)
            .param_opt(None::<String>);
        assert_eq!(call.params(), &[Value::from(10u64)]);
    }

    #[test]
    fn test_subscribe_call() {
        let call = SubscribeCall::new(
            "chain_subscribeNewHead",
            "chain_unsubscribeNewHead",
            ResultType::<Value>::json(),
        );
        assert_eq!(call.method(), "chain_subscribeNewHead");
        assert_eq!(call.unsubscribe_method(), "chain_unsubscribeNewHead");
        assert!(call.params().is_empty());
    }
}
