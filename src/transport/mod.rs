//! Transport layer for the daemon connection.
//!
//! The driver talks to the daemon through the [`Transport`] seam so that the
//! connection state machine can be exercised without a live daemon. The
//! production implementation is [`TcpTransport`] over a plain TCP stream.
//!
//! # Connection Lifecycle
//!
//! 1. `Transport::open` - establish a byte stream to the endpoint
//! 2. [`Connection`] - one live stream plus its activity timestamps
//! 3. `Connection::write_frame` / `Connection::read_frame` - one exchange
//! 4. `Connection::close` - idempotent teardown, never observable as an error
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Live connection with activity tracking and frame IO |
//! | `tcp` | TCP stream transport |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// Live connection with activity tracking and frame IO.
pub mod connection;

/// TCP stream transport.
pub mod tcp;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use tcp::TcpTransport;

// ============================================================================
// Transport
// ============================================================================

/// Factory for byte streams to a daemon endpoint.
///
/// Implementations must be cheap to share; the driver holds one behind an
/// `Arc` for the lifetime of the session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a byte stream to the endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`](crate::Error::Connect) if the endpoint is unreachable
    /// - [`Error::ConnectTimeout`](crate::Error::ConnectTimeout) if the attempt
    ///   exceeds the transport's connect timeout
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn TransportStream>>;
}

// ============================================================================
// TransportStream
// ============================================================================

/// One open byte stream to the daemon.
#[async_trait]
pub trait TransportStream: Send {
    /// Writes all bytes to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) when the write fails.
    async fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Reads available bytes into `buf`, waiting up to `timeout`.
    ///
    /// A return of `Ok(0)` means the peer closed the stream.
    ///
    /// # Errors
    ///
    /// - [`Error::ReadTimeout`](crate::Error::ReadTimeout) if nothing arrives in time
    /// - [`Error::Io`](crate::Error::Io) on a socket error
    async fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Closes the stream. Idempotent; close failures are swallowed.
    async fn close(&mut self);
}
