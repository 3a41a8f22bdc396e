//! Completion handle of a submitted call.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, Result};

// ============================================================================
// ResponseFuture
// ============================================================================

/// Resolves to the decoded result of one call.
///
/// The dispatch loop is the only producer; it completes the handle exactly
/// once with the result, an RPC error, or the reason the connection ended.
/// Dropping the handle does not cancel the call.
#[must_use = "a response future does nothing unless awaited"]
#[derive(Debug)]
pub struct ResponseFuture<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> ResponseFuture<T> {
    /// Creates a handle and the sender that completes it.
    pub(crate) fn channel() -> (oneshot::Sender<Result<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Creates a handle that is already failed.
    pub(crate) fn failed(error: Error) -> Self {
        let (tx, future) = Self::channel();
        let _ = tx.send(Err(error));
        future
    }
}

impl<T> Future for ResponseFuture<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|e| Err(Error::from(e))))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_with_value() {
        let (tx, future) = ResponseFuture::channel();
        tx.send(Ok(7u32)).expect("send");
        assert_eq!(future.await.expect("value"), 7);
    }

    #[tokio::test]
    async fn test_failed() {
        let future = ResponseFuture::<()>::failed(Error::NotConnected);
        assert!(matches!(future.await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_dropped_sender() {
        let (tx, future) = ResponseFuture::<()>::channel();
        drop(tx);
        assert!(matches!(future.await, Err(Error::ChannelClosed(_))));
    }
}
