//! Keepalive staleness tracking.
//!
//! The daemon silently closes sockets that stay idle past its keepalive
//! window. Discovering that only through a failed write is ambiguous on some
//! transports, so the driver asks the tracker *before* each send whether the
//! existing connection is still trustworthy and reopens proactively when it
//! is not.
//!
//! Staleness is computed on demand from the connection's last-activity
//! timestamp. There is no stored "stale" flag and no background sweep.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Default staleness threshold.
///
/// Matches the daemon's 3000 ms idle-close window; a connection unused for
/// longer than this is presumed already closed on the far end.
pub const DEFAULT_STALENESS_THRESHOLD: Duration = Duration::from_millis(3000);

// ============================================================================
// KeepaliveTracker
// ============================================================================

/// Decides whether an existing connection is still usable.
///
/// Pure function of timestamps: the tracker holds only its configured
/// threshold and reads everything else from the [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveTracker {
    /// Idle duration beyond which a connection is presumed dead.
    threshold: Duration,
}

impl KeepaliveTracker {
    /// Creates a tracker with the given staleness threshold.
    #[inline]
    #[must_use]
    pub const fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    /// Returns the staleness threshold.
    #[inline]
    #[must_use]
    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Returns `true` when the connection has been idle longer than the
    /// threshold as of `now`.
    #[inline]
    #[must_use]
    pub fn is_stale(&self, connection: &Connection, now: Instant) -> bool {
        self.expired(connection.last_activity(), now)
    }

    /// Records activity on the connection at `now`.
    #[inline]
    pub fn touch(&self, connection: &mut Connection, now: Instant) {
        connection.touch(now);
    }

    /// Strict comparison: exactly at the threshold is still fresh.
    fn expired(&self, last_activity: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_activity) > self.threshold
    }
}

impl Default for KeepaliveTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_THRESHOLD)
    }
}

// ============================================================================
// Tests
// ============================================================================
