//! Error types for the dbsync client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use dbsync_client::{Command, Driver, Result};
//!
//! async fn example(driver: &Driver) -> Result<()> {
//!     let reply = driver.send(&Command::new("PING")).await?;
//!     println!("{}", reply.text());
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connect | [`Error::Connect`], [`Error::ConnectTimeout`] |
//! | Transport | [`Error::Io`], [`Error::ReadTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`] |
//!
//! Transport errors cause the driver to discard the current connection so the
//! next `send` reopens from scratch. Protocol errors leave the connection in
//! place: a malformed reply does not imply a dead socket.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when driver or endpoint configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connect Errors
    // ========================================================================
    /// Cannot establish a transport to the daemon.
    ///
    /// Fatal to the current `send` call; the driver does not retry.
    #[error("Connect failed: {message}")]
    Connect {
        /// Description of the connect error.
        message: String,
    },

    /// Connect attempt exceeded the connect timeout.
    #[error("Connect timeout after {timeout_ms}ms")]
    ConnectTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// No reply arrived within the read timeout.
    ///
    /// The connection is presumed dead and is discarded.
    #[error("Read timeout after {timeout_ms}ms")]
    ReadTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Peer closed the connection mid-operation.
    ///
    /// Typical when the daemon idle-closed the socket and the client wrote
    /// into the closed half anyway.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// IO error on the underlying socket.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Reply bytes did not parse as a well-formed frame.
    ///
    /// The connection is kept alive: a bad frame is not evidence the
    /// transport itself has failed.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connect error.
    #[inline]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a connect timeout error.
    #[inline]
    pub fn connect_timeout(timeout_ms: u64) -> Self {
        Self::ConnectTimeout { timeout_ms }
    }

    /// Creates a read timeout error.
    #[inline]
    pub fn read_timeout(timeout_ms: u64) -> Self {
        Self::ReadTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout { .. } | Self::ReadTimeout { .. }
        )
    }

    /// Returns `true` if the transport could not be established.
    #[inline]
    #[must_use]
    pub fn is_connect_error(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::ConnectTimeout { .. })
    }

    /// Returns `true` if an established transport failed mid-operation.
    ///
    /// The driver discards the connection on these errors; the next `send`
    /// reopens transparently.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::ReadTimeout { .. } | Self::ConnectionClosed
        )
    }

    /// Returns `true` if this is a protocol error.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }

    /// Returns `true` if a retry of `send` may succeed.
    ///
    /// After a transport error the session slot is already cleared, so the
    /// retry starts from a fresh connection.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.is_transport_error() || self.is_timeout()
    }
}

// ============================================================================
// Tests
// ============================================================================
