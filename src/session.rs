//! Session state: the driver's connection slot.
//!
//! A session holds at most one [`Connection`] at a time. The slot starts
//! absent, is populated lazily by the first `send`, is cleared by `reset`,
//! detected staleness, or a transport failure, and is torn down when the
//! owning driver is dropped.
//!
//! The slot is guarded by an async mutex: `send` and `reset` on the same
//! driver are serialized through it, because opening, closing, and mutating
//! the slot are not independently atomic. No other state is shared.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::{Mutex, MutexGuard};

use crate::transport::Connection;

// ============================================================================
// Session
// ============================================================================

/// Holder of zero-or-one live connection.
#[derive(Debug, Default)]
pub struct Session {
    /// The guarded connection slot. `None` is the Absent state.
    slot: Mutex<Option<Connection>>,
}

impl Session {
    /// Creates an empty session.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the connection slot.
    ///
    /// The guard is held across a full `send` or `reset`, which is what
    /// serializes concurrent callers.
    #[inline]
    pub async fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.slot.lock().await
    }

    /// Returns `true` if the session currently holds a connection.
    #[inline]
    pub async fn is_open(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
