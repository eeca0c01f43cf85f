//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and creating [`Driver`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dbsync_client::Driver;
//!
//! # fn example() -> dbsync_client::Result<()> {
//! let driver = Driver::builder()
//!     .endpoint("127.0.0.1:1111")
//!     .staleness_threshold(Duration::from_secs(3))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::transport::{TcpTransport, Transport};

use super::core::Driver;
use super::options::DriverOptions;

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder. An unset endpoint
/// falls back to the extension's historical default, `127.0.0.1:1111`.
#[derive(Default, Clone)]
pub struct DriverBuilder {
    /// Raw endpoint string, validated at build time.
    endpoint: Option<String>,
    /// Driver options accumulated so far.
    options: DriverOptions,
    /// Custom transport, mainly for tests. `None` means TCP.
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for DriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a new driver builder with default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the daemon endpoint as a `host:port` string.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Single target, e.g. `"127.0.0.1:1111"`
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_connect_timeout(timeout);
        self
    }

    /// Sets the read timeout.
    #[inline]
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_read_timeout(timeout);
        self
    }

    /// Sets the staleness threshold.
    ///
    /// Should match the daemon's idle-close window.
    #[inline]
    #[must_use]
    pub fn staleness_threshold(mut self, threshold: Duration) -> Self {
        self.options = self.options.with_staleness_threshold(threshold);
        self
    }

    /// Enables or disables keepalive.
    ///
    /// With keepalive off, every `send` opens and closes its own connection.
    #[inline]
    #[must_use]
    pub fn keepalive(mut self, keepalive: bool) -> Self {
        self.options = self.options.with_keepalive(keepalive);
        self
    }

    /// Replaces the TCP transport with a custom implementation.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the driver with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the endpoint string
    /// does not parse as a single `host:port` target.
    pub fn build(self) -> Result<Driver> {
        let endpoint = match self.endpoint {
            Some(raw) => raw.parse::<Endpoint>()?,
            None => Endpoint::default(),
        };

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(TcpTransport::new(self.options.connect_timeout)));

        Ok(Driver::new(endpoint, self.options, transport))
    }
}

// ============================================================================
// Tests
// ============================================================================
