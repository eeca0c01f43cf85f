//! Timeouts and keepalive settings.
//!
//! All defaults are 3000 ms, matching the connection timeout of the original
//! driver and the daemon's idle-close window. The staleness threshold is a
//! client-side presumption, not protocol truth: deployments with a different
//! daemon keepalive window must configure it to match.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dbsync_client::DriverOptions;
//!
//! let options = DriverOptions::new()
//!     .with_staleness_threshold(Duration::from_secs(10))
//!     .with_keepalive(false);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::keepalive::DEFAULT_STALENESS_THRESHOLD;
use crate::transport::tcp::DEFAULT_CONNECT_TIMEOUT;

// ============================================================================
// Constants
// ============================================================================

/// Default bound on waiting for a reply.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(3000);

// ============================================================================
// DriverOptions
// ============================================================================

/// Driver configuration: timeouts and keepalive behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// Upper bound on one connect attempt.
    pub connect_timeout: Duration,

    /// Upper bound on each wait for reply bytes.
    pub read_timeout: Duration,

    /// Idle duration beyond which a connection is presumed dead.
    pub staleness_threshold: Duration,

    /// Whether to keep the connection between sends.
    ///
    /// When `false` every `send` opens and closes its own connection,
    /// matching the keepalive-off mode of the original extension.
    pub keepalive: bool,
}

// ============================================================================
// Constructors
// ============================================================================

impl DriverOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            staleness_threshold: DEFAULT_STALENESS_THRESHOLD,
            keepalive: true,
        }
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    #[inline]
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the staleness threshold.
    #[inline]
    #[must_use]
    pub const fn with_staleness_threshold(mut self, threshold: Duration) -> Self {
        self.staleness_threshold = threshold;
        self
    }

    /// Enables or disables keepalive.
    #[inline]
    #[must_use]
    pub const fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
