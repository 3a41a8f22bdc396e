//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use dotwire::Client;
//!
//! # async fn example() -> dotwire::Result<()> {
//! let client = Client::builder()
//!     .url("ws://127.0.0.1:9944")
//!     .connect_timeout(Duration::from_secs(10))
//!     .connect()
//!     .await?;
//! # let _ = client;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::transport::KeepAlive;

use super::core::Client;
use super::options::ClientOptions;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Node endpoint.
    url: Option<String>,
    /// Connection settings.
    options: ClientOptions,
    /// Whether keepalive pings are sent.
    keepalive_enabled: Option<bool>,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default settings and no endpoint.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node endpoint.
    ///
    /// # Arguments
    ///
    /// * `url` - WebSocket URL (e.g., "ws://127.0.0.1:9944")
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the handshake timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Sets the delay before the first keepalive ping.
    #[inline]
    #[must_use]
    pub fn keepalive_delay(mut self, delay: Duration) -> Self {
        self.keepalive_mut().delay = delay;
        self
    }

    /// Sets the period between keepalive pings.
    #[inline]
    #[must_use]
    pub fn keepalive_period(mut self, period: Duration) -> Self {
        self.keepalive_mut().period = period;
        self
    }

    /// Enables or disables keepalive pings.
    #[inline]
    #[must_use]
    pub fn keepalive(mut self, enabled: bool) -> Self {
        self.keepalive_enabled = Some(enabled);
        self
    }

    /// Sets the inbound message size limit in bytes.
    #[inline]
    #[must_use]
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.options.max_message_size = bytes;
        self
    }

    /// Sets a callback invoked once when the client is closed.
    #[inline]
    #[must_use]
    pub fn on_close(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.options = self.options.with_on_close(callback);
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the client with validation. The client starts disconnected.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL is missing or not `ws`/`wss`
    /// - [`Error::Url`] if the URL cannot be parsed
    /// - [`Error::Config`] if a timeout, period or size limit is zero
    pub fn build(self) -> Result<Client> {
        let url = self.validate_url()?;
        let options = self.validate_options()?;

        Ok(Client::new(url, options))
    }

    /// Builds the client and opens the first connection.
    ///
    /// # Errors
    ///
    /// Everything [`build`](Self::build) and [`Client::connect`] return.
    pub async fn connect(self) -> Result<Client> {
        let client = self.build()?;
        client.connect().await?;
        Ok(client)
    }

    fn keepalive_mut(&mut self) -> &mut KeepAlive {
        self.options.keepalive.get_or_insert_with(KeepAlive::default)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates the endpoint.
    fn validate_url(&self) -> Result<Url> {
        let raw = self.url.as_deref().ok_or_else(|| {
            Error::config(
                "Node URL is required. Use .url() to set it.\n\
                 Example: Client::builder().url(\"ws://127.0.0.1:9944\")",
            )
        })?;

        let url = Url::parse(raw)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "Unsupported URL scheme '{other}'. Use ws:// or wss://"
            ))),
        }
    }

    /// Validates timeouts and limits.
    fn validate_options(&self) -> Result<ClientOptions> {
        let mut options = self.options.clone();

        if options.connect_timeout.is_zero() {
            return Err(Error::config("Connect timeout must be greater than zero"));
        }

        if self.keepalive_enabled == Some(false) {
            options.keepalive = None;
        }

        if let Some(keepalive) = options.keepalive
            && keepalive.period.is_zero()
        {
            return Err(Error::config("Keepalive period must be greater than zero"));
        }

        if options.max_message_size == 0 {
            return Err(Error::config("Max message size must be greater than zero"));
        }

        Ok(options)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ClientBuilder::new();
        assert!(builder.url.is_none());
        assert!(builder.options.keepalive.is_some());
    }

    #[test]
    fn test_missing_url() {
        let err = ClientBuilder::new().build().expect_err("no url");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_invalid_url() {
        let err = ClientBuilder::new().url("not a url").build().expect_err("parse");
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_http_scheme_rejected() {
        let err = ClientBuilder::new()
            .url("http://127.0.0.1:9933")
            .build()
            .expect_err("scheme");
        assert!(err.to_string().contains("Unsupported URL scheme"));
    }

    #[test]
    fn test_build_starts_disconnected() {
        let client = ClientBuilder::new()
            .url("ws://127.0.0.1:9944")
            .build()
            .expect("build");
        assert_eq!(client.state(), crate::client::ConnectionState::Disconnected);
        assert_eq!(client.url().as_str(), "ws://127.0.0.1:9944/");
    }

    #[test]
    fn test_keepalive_settings() {
        let builder = ClientBuilder::new()
            .keepalive_delay(Duration::from_secs(1))
            .keepalive_period(Duration::from_secs(2));
        assert_eq!(
            builder.options.keepalive,
            Some(KeepAlive {
                delay: Duration::from_secs(1),
                period: Duration::from_secs(2),
            })
        );
    }

    #[test]
    fn test_keepalive_disabled() {
        let builder = ClientBuilder::new().url("ws://localhost:9944").keepalive(false);
        let options = builder.validate_options().expect("valid");
        assert!(options.keepalive.is_none());
    }

    #[test]
    fn test_zero_values_rejected() {
        let base = ClientBuilder::new().url("ws://localhost:9944");
        assert!(base.clone().connect_timeout(Duration::ZERO).build().is_err());
        assert!(base.clone().keepalive_period(Duration::ZERO).build().is_err());
        assert!(base.max_message_size(0).build().is_err());
    }
}
