//! Live connection with activity tracking and frame IO.
//!
//! A [`Connection`] owns exactly one open [`TransportStream`] plus the
//! timestamps the keepalive tracker reads. The reply read loop discovers the
//! total frame size from the header mid-stream and keeps reading until the
//! frame is complete, the peer closes, or the read timeout fires.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::protocol::frame;
use crate::transport::TransportStream;

// ============================================================================
// Constants
// ============================================================================

/// Read chunk size for reply assembly.
const READ_CHUNK: usize = 4096;

// ============================================================================
// Connection
// ============================================================================

/// One live transport to the daemon.
///
/// Owned exclusively by the driver's session slot. The last-activity
/// timestamp is updated only through `touch`, which the driver calls after a
/// successful exchange and never after a failed one.
pub struct Connection {
    /// The open byte stream.
    stream: Box<dyn TransportStream>,
    /// Remote address this connection was opened to.
    endpoint: Endpoint,
    /// When the connection was opened.
    opened_at: Instant,
    /// Last successful exchange.
    last_activity: Instant,
}

impl Connection {
    /// Wraps a freshly opened stream.
    #[must_use]
    pub(crate) fn new(stream: Box<dyn TransportStream>, endpoint: Endpoint) -> Self {
        let now = Instant::now();
        Self {
            stream,
            endpoint,
            opened_at: now,
            last_activity: now,
        }
    }

    /// Returns the remote endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns when the connection was opened.
    #[inline]
    #[must_use]
    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Returns the last-activity timestamp.
    #[inline]
    #[must_use]
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Returns how long the connection has been idle as of `now`.
    #[inline]
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Records activity at `now`.
    #[inline]
    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Writes one encoded frame to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the write fails.
    pub(crate) async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        trace!(endpoint = %self.endpoint, bytes = frame.len(), "Writing frame");
        self.stream.write_all(frame).await
    }

    /// Reads one complete reply frame.
    ///
    /// The expected total size is parsed out of the header as soon as enough
    /// bytes have arrived; reading continues until the frame is complete.
    /// `read_timeout` bounds the whole reply: each read gets whatever is left
    /// of the budget, so a peer trickling bytes cannot stretch one exchange
    /// past the configured limit.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the peer closes before the frame completes
    /// - [`Error::ReadTimeout`] if the frame does not complete within `read_timeout`
    /// - [`Error::Protocol`] if the header is malformed (connection stays usable
    ///   from the transport's point of view)
    pub(crate) async fn read_frame(&mut self, read_timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + read_timeout;
        let mut acc: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut expected: Option<usize> = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(
                    endpoint = %self.endpoint,
                    received = acc.len(),
                    "Reply did not complete within the read timeout"
                );
                return Err(Error::read_timeout(read_timeout.as_millis() as u64));
            }

            let n = self.stream.read(&mut chunk, remaining).await?;
            if n == 0 {
                warn!(
                    endpoint = %self.endpoint,
                    received = acc.len(),
                    "Peer closed while reading reply"
                );
                return Err(Error::ConnectionClosed);
            }

            acc.extend_from_slice(&chunk[..n]);
            trace!(chunk = n, total = acc.len(), "Received reply chunk");

            if expected.is_none() {
                expected = frame::expected_len(&acc)?;
                if let Some(total) = expected {
                    trace!(total, "Reply frame size known");
                }
            }

            if let Some(total) = expected
                && acc.len() >= total
            {
                if acc.len() > total {
                    return Err(Error::protocol(format!(
                        "Reply overruns frame: expected {total} bytes, got {}",
                        acc.len()
                    )));
                }
                return Ok(acc);
            }
        }
    }

    /// Closes the underlying stream. Idempotent, never fails observably.
    pub(crate) async fn close(&mut self) {
        debug!(endpoint = %self.endpoint, "Closing connection");
        self.stream.close().await;
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("opened_at", &self.opened_at)
            .field("last_activity", &self.last_activity)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    /// Stream stub that serves scripted byte chunks.
    struct ChunkStream {
        chunks: Vec<Vec<u8>>,
        written: Vec<u8>,
    }

    impl ChunkStream {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks,
                written: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl TransportStream for ChunkStream {
        async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        async fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }

        async fn close(&mut self) {}
    }

    fn connection(chunks: Vec<Vec<u8>>) -> Connection {
        Connection::new(Box::new(ChunkStream::new(chunks)), Endpoint::default())
    }

    #[tokio::test]
    async fn test_read_frame_single_chunk() {
        let mut conn = connection(vec![b"ds:5:PONG\0".to_vec()]);
        let raw = conn.read_frame(Duration::from_secs(1)).await.expect("read");
        assert_eq!(raw, b"ds:5:PONG\0");
    }

    #[tokio::test]
    async fn test_read_frame_assembles_chunks() {
        // Size is only discoverable after the second chunk.
        let mut conn = connection(vec![
            b"ds".to_vec(),
            b":5:PO".to_vec(),
            b"NG\0".to_vec(),
        ]);
        let raw = conn.read_frame(Duration::from_secs(1)).await.expect("read");
        assert_eq!(raw, b"ds:5:PONG\0");
    }

    #[tokio::test]
    async fn test_read_frame_peer_close_is_connection_closed() {
        let mut conn = connection(vec![b"ds:5:PO".to_vec()]);
        let err = conn
            .read_frame(Duration::from_secs(1))
            .await
            .err()
            .expect("closed");
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_read_frame_bad_header_is_protocol_error() {
        let mut conn = connection(vec![b"xx:5:PONG\0".to_vec()]);
        let err = conn
            .read_frame(Duration::from_secs(1))
            .await
            .err()
            .expect("bad tag");
        assert!(err.is_protocol_error());
    }

    #[tokio::test]
    async fn test_read_frame_overrun_is_protocol_error() {
        let mut conn = connection(vec![b"ds:5:PONG\0garbage".to_vec()]);
        let err = conn
            .read_frame(Duration::from_secs(1))
            .await
            .err()
            .expect("overrun");
        assert!(err.is_protocol_error());
    }

    /// Stream stub that delivers one byte per read after a fixed delay.
    struct TrickleStream {
        data: Vec<u8>,
        pos: usize,
        delay: Duration,
    }

    #[async_trait]
    impl TransportStream for TrickleStream {
        async fn write_all(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }

        async fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
            tokio::time::sleep(self.delay).await;
            if self.pos >= self.data.len() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }

        async fn close(&mut self) {}
    }

    #[tokio::test]
    async fn test_read_frame_timeout_covers_whole_reply() {
        // Each byte arrives on time individually, but the full frame would
        // take far longer than the budget. The read must give up at the
        // budget, not per byte.
        let stream = TrickleStream {
            data: b"ds:5:PONG\0".to_vec(),
            pos: 0,
            delay: Duration::from_millis(40),
        };
        let mut conn = Connection::new(Box::new(stream), Endpoint::default());

        let err = conn
            .read_frame(Duration::from_millis(100))
            .await
            .err()
            .expect("budget exhausted");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_touch_updates_last_activity() {
        let mut conn = connection(vec![]);
        let before = conn.last_activity();
        let later = before + Duration::from_millis(500);

        conn.touch(later);
        assert_eq!(conn.last_activity(), later);
        assert_eq!(conn.idle_for(later + Duration::from_millis(100)), Duration::from_millis(100));
    }
}
