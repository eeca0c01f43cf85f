//! TCP stream transport.
//!
//! Production [`Transport`] implementation over [`tokio::net::TcpStream`].
//! Connect attempts are bounded by a configurable timeout; reads are bounded
//! per call by the timeout passed through [`TransportStream::read`].

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::transport::{Transport, TransportStream};

// ============================================================================
// Constants
// ============================================================================

/// Default connect timeout, matching the original driver's 3000 ms.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

// ============================================================================
// TcpTransport
// ============================================================================

/// Opens plain TCP streams to the daemon.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    /// Upper bound on one connect attempt.
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Creates a transport with the given connect timeout.
    #[inline]
    #[must_use]
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Returns the connect timeout.
    #[inline]
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn TransportStream>> {
        let addr = endpoint.addr();
        debug!(endpoint = %endpoint, "Opening TCP connection");

        let stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::connect_timeout(self.connect_timeout.as_millis() as u64))?
            .map_err(|e| Error::connect(format!("{addr}: {e}")))?;

        // Command/reply exchanges are small and latency-bound.
        let _ = stream.set_nodelay(true);

        Ok(Box::new(stream))
    }
}

// ============================================================================
// TransportStream for TcpStream
// ============================================================================

#[async_trait]
impl TransportStream for TcpStream {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        AsyncWriteExt::write_all(self, bytes).await?;
        trace!(bytes = bytes.len(), "Wrote to socket");
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8], read_timeout: Duration) -> Result<usize> {
        let n = timeout(read_timeout, AsyncReadExt::read(self, buf))
            .await
            .map_err(|_| Error::read_timeout(read_timeout.as_millis() as u64))??;

        trace!(bytes = n, "Read from socket");
        Ok(n)
    }

    async fn close(&mut self) {
        let _ = AsyncWriteExt::shutdown(self).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
