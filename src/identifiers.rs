//! Type-safe identifiers for requests, subscriptions and connection epochs.
//!
//! Newtype wrappers prevent mixing client-assigned request ids with
//! server-assigned subscription ids at compile time.
//!
//! | Type | Assigned by | Wire form |
//! |------|-------------|-----------|
//! | [`RequestId`] | Client, monotonic from 0 per epoch | JSON integer |
//! | [`SubscriptionId`] | Server | JSON string or integer |
//! | [`Epoch`] | Client, one per established socket | not on the wire |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Client-assigned id of a JSON-RPC request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request id from its numeric value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ============================================================================
// SubscriptionId
// ============================================================================

/// Server-assigned id of a subscription.
///
/// Opaque to the client. The JSON form the server used is preserved so the
/// unsubscribe call sends it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionId {
    /// String id, e.g. `"EthSQ9N3hbKBG5Mj"`.
    Str(String),
    /// Numeric id, used by older nodes.
    Num(u64),
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for SubscriptionId {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for SubscriptionId {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<u64> for SubscriptionId {
    #[inline]
    fn from(value: u64) -> Self {
        Self::Num(value)
    }
}

impl From<&SubscriptionId> for serde_json::Value {
    fn from(id: &SubscriptionId) -> Self {
        match id {
            SubscriptionId::Str(s) => Self::String(s.clone()),
            SubscriptionId::Num(n) => Self::from(*n),
        }
    }
}

// ============================================================================
// Epoch
// ============================================================================

/// Generation counter of the underlying socket.
///
/// Every successful (re)connect starts a new epoch. State created in an
/// earlier epoch is never matched against messages from a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(u64);

impl Epoch {
    /// Creates an epoch from its generation number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the generation number.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the epoch following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_serializes_as_number() {
        let json = serde_json::to_string(&RequestId::new(7)).expect("serialize");
        assert_eq!(json, "7");
    }

    #[test]
    fn test_subscription_id_string_form() {
        let id: SubscriptionId = serde_json::from_str(r#""abc""#).expect("parse");
        assert_eq!(id, SubscriptionId::from("abc"));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), r#""abc""#);
    }

    #[test]
    fn test_subscription_id_number_form() {
        let id: SubscriptionId = serde_json::from_str("42").expect("parse");
        assert_eq!(id, SubscriptionId::Num(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_subscription_id_as_param() {
        assert_eq!(
            serde_json::Value::from(&SubscriptionId::from("abc")),
            serde_json::json!("abc")
        );
        assert_eq!(
            serde_json::Value::from(&SubscriptionId::Num(3)),
            serde_json::json!(3)
        );
    }

    #[test]
    fn test_subscription_id_rejects_objects() {
        assert!(serde_json::from_str::<SubscriptionId>("{}").is_err());
    }

    #[test]
    fn test_epoch_next() {
        let epoch = Epoch::default();
        assert_eq!(epoch.value(), 0);
        assert_eq!(epoch.next().value(), 1);
        assert_eq!(epoch.next().to_string(), "epoch#1");
    }
}
