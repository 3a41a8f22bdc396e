//! Inbound message types.
//!
//! Inbound messages are classified by shape, not by a schema:
//!
//! | Shape | Classified as |
//! |-------|---------------|
//! | `id` + `result` or `error` | [`Envelope::Response`] |
//! | `method` + `params.subscription` | [`Envelope::Notification`] |
//!
//! The `result` payload is kept as raw JSON text until the caller has
//! looked up the expected type by id, then decoded in one pass.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, SubscriptionId};

// ============================================================================
// RpcError
// ============================================================================

/// Error object of a JSON-RPC error envelope.
///
/// # Format
///
/// ```json
/// { "code": -32601, "message": "Method not found", "data": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,

    /// Additional data. Non-string JSON is kept in its serialized form.
    #[serde(default, deserialize_with = "data_as_string", skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl RpcError {
    /// Code used for internal client-side failures.
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Creates an RPC error.
    #[inline]
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>, data: Option<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

fn data_as_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<&'de RawValue>, D::Error> {
    <&RawValue>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Wire Shape
// ============================================================================

/// Union of every field an inbound message may carry.
#[derive(Deserialize)]
struct RawEnvelope<'a> {
    #[serde(default)]
    id: Option<RequestId>,

    #[serde(default, borrow, deserialize_with = "present")]
    result: Option<&'a RawValue>,

    #[serde(default)]
    error: Option<RpcError>,

    #[serde(default)]
    method: Option<String>,

    #[serde(default, borrow)]
    params: Option<RawParams<'a>>,
}

#[derive(Deserialize)]
struct RawParams<'a> {
    subscription: SubscriptionId,

    #[serde(borrow)]
    result: &'a RawValue,
}

// ============================================================================
// Envelope
// ============================================================================

/// A classified inbound message, borrowing from the source text.
#[derive(Debug)]
pub enum Envelope<'a> {
    /// Reply to a request.
    Response {
        /// Id of the request this answers.
        id: RequestId,
        /// Raw JSON result, or the error object.
        outcome: std::result::Result<&'a str, RpcError>,
    },

    /// Server-pushed subscription event.
    Notification {
        /// Notification method, e.g. `chain_newHead`.
        method: String,
        /// Server-assigned subscription id.
        subscription: SubscriptionId,
        /// Raw JSON event payload.
        result: &'a str,
    },
}

impl<'a> Envelope<'a> {
    /// Classifies an inbound message.
    ///
    /// A response needs `result` or `error` next to its `id`. A `null`
    /// result yields the raw text `null`, so `Option<T>` results decode
    /// to `None`.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not a JSON object
    /// - [`Error::MalformedInput`] if the object matches neither shape
    pub fn parse(text: &'a str) -> Result<Self> {
        let raw: RawEnvelope<'a> = serde_json::from_str(text)?;

        if let (Some(id), None) = (raw.id, raw.method.as_ref()) {
            let outcome = match (raw.error, raw.result) {
                (Some(error), _) => Err(error),
                (None, Some(result)) => Ok(result.get()),
                (None, None) => {
                    return Err(Error::malformed(format!(
                        "response {id} carries neither result nor error"
                    )));
                }
            };
            return Ok(Self::Response { id, outcome });
        }

        match (raw.method, raw.params) {
            (Some(method), Some(params)) => Ok(Self::Notification {
                method,
                subscription: params.subscription,
                result: params.result.get(),
            }),
            _ => Err(Error::malformed("message is neither a response nor a notification")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let text = r#"{"jsonrpc":"2.0","result":{"a":[1,2]},"id":3}"#;
        match Envelope::parse(text).expect("parse") {
            Envelope::Response { id, outcome } => {
                assert_eq!(id, RequestId::new(3));
                assert_eq!(outcome.expect("success"), r#"{"a":[1,2]}"#);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_result_before_id() {
        let text = r#"{"result":"0x01","id":0}"#;
        assert!(matches!(
            Envelope::parse(text).expect("parse"),
            Envelope::Response { outcome: Ok("\"0x01\""), .. }
        ));
    }

    #[test]
    fn test_null_result() {
        let text = r#"{"jsonrpc":"2.0","result":null,"id":1}"#;
        assert!(matches!(
            Envelope::parse(text).expect("parse"),
            Envelope::Response { outcome: Ok("null"), .. }
        ));
    }

    #[test]
    fn test_response_without_result_or_error() {
        let err = Envelope::parse(r#"{"jsonrpc":"2.0","id":3}"#).expect_err("no outcome");
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn test_error_response() {
        let text = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":5}"#;
        match Envelope::parse(text).expect("parse") {
            Envelope::Response { outcome: Err(error), .. } => {
                assert_eq!(error.code, -32601);
                assert_eq!(error.message, "Method not found");
                assert_eq!(error.data, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_data_object_kept_as_text() {
        let text = r#"{"id":5,"error":{"code":1010,"message":"Invalid","data":{"x":1}}}"#;
        match Envelope::parse(text).expect("parse") {
            Envelope::Response { outcome: Err(error), .. } => {
                assert_eq!(error.data.as_deref(), Some(r#"{"x":1}"#));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_notification() {
        let text = r#"{"jsonrpc":"2.0","method":"chain_newHead","params":{"subscription":"abc","result":{"number":"0x1"}}}"#;
        match Envelope::parse(text).expect("parse") {
            Envelope::Notification {
                method,
                subscription,
                result,
            } => {
                assert_eq!(method, "chain_newHead");
                assert_eq!(subscription, SubscriptionId::from("abc"));
                assert_eq!(result, r#"{"number":"0x1"}"#);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_numeric_subscription_id() {
        let text = r#"{"method":"m","params":{"subscription":7,"result":1}}"#;
        assert!(matches!(
            Envelope::parse(text).expect("parse"),
            Envelope::Notification { subscription: SubscriptionId::Num(7), .. }
        ));
    }

    #[test]
    fn test_unroutable() {
        assert!(Envelope::parse(r#"{"jsonrpc":"2.0"}"#).is_err());
        assert!(Envelope::parse(r#"{"method":"m"}"#).is_err());
        assert!(Envelope::parse("not json").is_err());
        assert!(Envelope::parse(r#"{"id":"x","result":1}"#).is_err());
    }

    #[test]
    fn test_rpc_error_display() {
        let error = RpcError::new(-32000, "boom", Some("detail".into()));
        assert_eq!(error.to_string(), "-32000: boom");
    }
}
