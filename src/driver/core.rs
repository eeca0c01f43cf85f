//! Core driver implementation.
//!
//! The [`Driver`] owns the session slot and drives the connection state
//! machine: **Absent → Open** on a successful connect, **Open → Absent** on
//! reset, on a send-time transport failure, or on detected staleness followed
//! by a reopen. There are no other transitions and no persisted "stale"
//! state; staleness is recomputed from timestamps on every send.
//!
//! # Failure policy
//!
//! The driver never retries inside one `send`. A transport failure clears
//! the slot so a caller-issued retry starts from a fresh connection. A
//! protocol failure (unparsable reply) leaves the connection in place.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::keepalive::KeepaliveTracker;
use crate::protocol::frame;
use crate::protocol::{Command, Reply};
use crate::session::Session;
use crate::transport::{Connection, Transport};

use super::builder::DriverBuilder;
use super::options::DriverOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
struct DriverInner {
    /// The single daemon endpoint.
    endpoint: Endpoint,

    /// Timeouts and keepalive settings.
    options: DriverOptions,

    /// Transport used to open connections.
    transport: Arc<dyn Transport>,

    /// Staleness decisions and activity bookkeeping.
    tracker: KeepaliveTracker,

    /// The zero-or-one connection slot.
    session: Session,
}

// ============================================================================
// Driver
// ============================================================================

/// Keepalived connection driver.
///
/// Maintains at most one live connection to the daemon, established lazily
/// on the first `send` and reused while fresh. Cloning is cheap and all
/// clones share the same session.
///
/// # Examples
///
/// ```no_run
/// use dbsync_client::{Command, Driver};
///
/// # async fn example() -> dbsync_client::Result<()> {
/// let driver = Driver::builder().endpoint("127.0.0.1:1111").build()?;
///
/// let reply = driver.send(&Command::new("PING")).await?;
/// assert_eq!(reply.text(), "PONG");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    inner: Arc<DriverInner>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("endpoint", &self.inner.endpoint)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Sends one command and waits for its reply.
    ///
    /// Ensures a live connection first: opens lazily when the slot is
    /// absent, and proactively replaces a connection that has been idle past
    /// the staleness threshold. On success the connection's last-activity
    /// timestamp is refreshed.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`](crate::Error::Connect) /
    ///   [`Error::ConnectTimeout`](crate::Error::ConnectTimeout) if no
    ///   transport could be established; the slot stays absent
    /// - [`Error::Io`](crate::Error::Io),
    ///   [`Error::ReadTimeout`](crate::Error::ReadTimeout), or
    ///   [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the
    ///   transport failed mid-exchange; the connection is discarded and the
    ///   next `send` reopens
    /// - [`Error::Protocol`](crate::Error::Protocol) if the reply did not
    ///   parse; the connection is kept
    pub async fn send(&self, command: &Command) -> Result<Reply> {
        let mut slot = self.inner.session.lock().await;

        let mut conn = match slot.take() {
            Some(mut conn) if self.inner.tracker.is_stale(&conn, Instant::now()) => {
                debug!(
                    endpoint = %conn.endpoint(),
                    idle_ms = conn.idle_for(Instant::now()).as_millis() as u64,
                    "Connection idle past threshold, reopening"
                );
                conn.close().await;
                self.open_connection().await?
            }
            Some(conn) => conn,
            None => self.open_connection().await?,
        };

        match Self::exchange(&mut conn, command, self.inner.options.read_timeout).await {
            Ok(reply) => {
                self.inner.tracker.touch(&mut conn, Instant::now());
                trace!(command = command.name(), reply = reply.text(), "Exchange complete");

                if self.inner.options.keepalive {
                    *slot = Some(conn);
                } else {
                    conn.close().await;
                }
                Ok(reply)
            }
            Err(e) if e.is_transport_error() => {
                warn!(error = %e, "Transport failed mid-exchange, discarding connection");
                conn.close().await;
                Err(e)
            }
            Err(e) => {
                // Malformed reply: the socket itself is presumed fine, but
                // with keepalive off the slot never persists between sends.
                if self.inner.options.keepalive {
                    *slot = Some(conn);
                } else {
                    conn.close().await;
                }
                Err(e)
            }
        }
    }

    /// Tears down the current connection, if any.
    ///
    /// Idempotent and infallible. Does not open a new connection; opening is
    /// always lazy, on the next `send`.
    pub async fn reset(&self) {
        let mut slot = self.inner.session.lock().await;
        match slot.take() {
            Some(mut conn) => {
                debug!(endpoint = %conn.endpoint(), "Explicit reset");
                conn.close().await;
            }
            None => trace!("Reset with no active connection"),
        }
    }

    /// Returns `true` if the session currently holds a connection.
    ///
    /// The answer says nothing about staleness; a held connection may still
    /// be replaced on the next `send`.
    #[inline]
    pub async fn is_connected(&self) -> bool {
        self.inner.session.is_open().await
    }

    /// Returns the configured endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Returns the driver options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DriverOptions {
        &self.inner.options
    }
}

// ============================================================================
// Driver - Internal API
// ============================================================================

impl Driver {
    /// Creates a driver from validated configuration.
    pub(crate) fn new(
        endpoint: Endpoint,
        options: DriverOptions,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let inner = Arc::new(DriverInner {
            endpoint,
            tracker: KeepaliveTracker::new(options.staleness_threshold),
            options,
            transport,
            session: Session::new(),
        });

        Self { inner }
    }

    /// Opens a fresh connection to the configured endpoint.
    async fn open_connection(&self) -> Result<Connection> {
        let stream = self.inner.transport.open(&self.inner.endpoint).await?;
        debug!(endpoint = %self.inner.endpoint, "Connection established");
        Ok(Connection::new(stream, self.inner.endpoint.clone()))
    }

    /// Runs one framed command/reply exchange on the connection.
    async fn exchange(
        conn: &mut Connection,
        command: &Command,
        read_timeout: Duration,
    ) -> Result<Reply> {
        let request = frame::encode(command);
        trace!(command = command.name(), bytes = request.len(), "Sending command");

        conn.write_frame(&request).await?;
        let raw = conn.read_frame(read_timeout).await?;
        frame::decode(&raw)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::io::{Error as IoError, ErrorKind};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::transport::TransportStream;

    /// Encoded `PONG` reply frame.
    const PONG: &[u8] = b"ds:5:PONG\0";

    /// One scripted write/read round on a mock stream.
    enum Exchange {
        /// Write succeeds, the given frame becomes readable.
        Reply(&'static [u8]),
        /// Write fails with a broken pipe.
        WriteError,
        /// Write succeeds but the peer has closed: reads return 0.
        Eof,
    }

    struct MockStream {
        exchanges: VecDeque<Exchange>,
        rx: Vec<u8>,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TransportStream for MockStream {
        async fn write_all(&mut self, _bytes: &[u8]) -> Result<()> {
            match self.exchanges.pop_front() {
                Some(Exchange::Reply(frame)) => {
                    self.rx.extend_from_slice(frame);
                    Ok(())
                }
                Some(Exchange::WriteError) => {
                    Err(IoError::new(ErrorKind::BrokenPipe, "broken pipe").into())
                }
                Some(Exchange::Eof) | None => Ok(()),
            }
        }

        async fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
            if self.rx.is_empty() {
                return Ok(0);
            }
            let n = self.rx.len().min(buf.len());
            buf[..n].copy_from_slice(&self.rx[..n]);
            self.rx.drain(..n);
            Ok(n)
        }

        async fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Outcome of one scripted `open` call.
    enum Open {
        Connect(Vec<Exchange>),
        Refuse,
    }

    struct MockTransport {
        scripts: StdMutex<VecDeque<Open>>,
        opens: AtomicUsize,
        closes: Arc<AtomicUsize>,
    }

    impl MockTransport {
        fn new(scripts: Vec<Open>) -> Arc<Self> {
            Arc::new(Self {
                scripts: StdMutex::new(scripts.into()),
                opens: AtomicUsize::new(0),
                closes: Arc::new(AtomicUsize::new(0)),
            })
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn open(&self, _endpoint: &Endpoint) -> Result<Box<dyn TransportStream>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            match self.scripts.lock().expect("scripts lock").pop_front() {
                Some(Open::Connect(exchanges)) => Ok(Box::new(MockStream {
                    exchanges: exchanges.into(),
                    rx: Vec::new(),
                    closes: Arc::clone(&self.closes),
                })),
                Some(Open::Refuse) => Err(crate::Error::connect("scripted refusal")),
                None => Err(crate::Error::connect("no scripted connection left")),
            }
        }
    }

    fn driver_with(transport: &Arc<MockTransport>, threshold: Duration) -> Driver {
        Driver::builder()
            .endpoint("127.0.0.1:1111")
            .staleness_threshold(threshold)
            .transport(Arc::clone(transport) as Arc<dyn Transport>)
            .build()
            .expect("build driver")
    }

    fn ping() -> Command {
        Command::new("PING")
    }

    #[tokio::test]
    async fn test_first_send_opens_exactly_once() {
        let transport = MockTransport::new(vec![Open::Connect(vec![Exchange::Reply(PONG)])]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        let reply = driver.send(&ping()).await.expect("ping");
        assert_eq!(reply.text(), "PONG");
        assert_eq!(transport.opens(), 1);
        assert!(driver.is_connected().await);
    }

    #[tokio::test]
    async fn test_immediate_second_send_reuses_connection() {
        let transport = MockTransport::new(vec![Open::Connect(vec![
            Exchange::Reply(PONG),
            Exchange::Reply(PONG),
        ])]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        driver.send(&ping()).await.expect("ping 1");
        driver.send(&ping()).await.expect("ping 2");

        assert_eq!(transport.opens(), 1);
        assert_eq!(transport.closes(), 0);
    }

    #[tokio::test]
    async fn test_stale_connection_is_replaced_before_send() {
        // Zero threshold: any elapsed time makes the connection stale.
        let transport = MockTransport::new(vec![
            Open::Connect(vec![Exchange::Reply(PONG)]),
            Open::Connect(vec![Exchange::Reply(PONG)]),
        ]);
        let driver = driver_with(&transport, Duration::ZERO);

        driver.send(&ping()).await.expect("ping 1");
        let reply = driver.send(&ping()).await.expect("ping 2");

        assert_eq!(reply.text(), "PONG");
        assert_eq!(transport.opens(), 2);
        assert_eq!(transport.closes(), 1);
    }

    #[tokio::test]
    async fn test_reset_then_send_opens_fresh_connection() {
        let transport = MockTransport::new(vec![
            Open::Connect(vec![Exchange::Reply(PONG)]),
            Open::Connect(vec![Exchange::Reply(PONG)]),
        ]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        driver.send(&ping()).await.expect("ping 1");
        driver.reset().await;
        assert!(!driver.is_connected().await);
        assert_eq!(transport.closes(), 1);

        driver.send(&ping()).await.expect("ping 2");
        assert_eq!(transport.opens(), 2);
    }

    #[tokio::test]
    async fn test_reset_on_absent_session_is_noop() {
        let transport = MockTransport::new(vec![]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        driver.reset().await;
        driver.reset().await;

        assert_eq!(transport.opens(), 0);
        assert_eq!(transport.closes(), 0);
        assert!(!driver.is_connected().await);
    }

    #[tokio::test]
    async fn test_io_error_clears_session_and_next_send_reopens() {
        let transport = MockTransport::new(vec![
            Open::Connect(vec![Exchange::WriteError]),
            Open::Connect(vec![Exchange::Reply(PONG)]),
        ]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        let err = driver.send(&ping()).await.err().expect("io failure");
        assert!(err.is_transport_error());
        assert!(!driver.is_connected().await);
        assert_eq!(transport.closes(), 1);

        let reply = driver.send(&ping()).await.expect("retry");
        assert_eq!(reply.text(), "PONG");
        assert_eq!(transport.opens(), 2);
    }

    #[tokio::test]
    async fn test_connect_error_propagates_and_session_stays_absent() {
        let transport = MockTransport::new(vec![Open::Refuse]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        let err = driver.send(&ping()).await.err().expect("refused");
        assert!(err.is_connect_error());
        assert!(!driver.is_connected().await);
        assert_eq!(transport.opens(), 1);
    }

    #[tokio::test]
    async fn test_protocol_error_keeps_connection() {
        let transport = MockTransport::new(vec![Open::Connect(vec![
            Exchange::Reply(b"xx:5:PONG\0"),
            Exchange::Reply(PONG),
        ])]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        let err = driver.send(&ping()).await.err().expect("bad frame");
        assert!(err.is_protocol_error());
        assert!(driver.is_connected().await);
        assert_eq!(transport.closes(), 0);

        // Same connection still serves the next exchange.
        let reply = driver.send(&ping()).await.expect("retry");
        assert_eq!(reply.text(), "PONG");
        assert_eq!(transport.opens(), 1);
    }

    #[tokio::test]
    async fn test_keepalive_disabled_closes_after_each_send() {
        let transport = MockTransport::new(vec![
            Open::Connect(vec![Exchange::Reply(PONG)]),
            Open::Connect(vec![Exchange::Reply(PONG)]),
        ]);
        let driver = Driver::builder()
            .keepalive(false)
            .transport(Arc::clone(&transport) as Arc<dyn Transport>)
            .build()
            .expect("build driver");

        driver.send(&ping()).await.expect("ping 1");
        assert!(!driver.is_connected().await);

        driver.send(&ping()).await.expect("ping 2");
        assert_eq!(transport.opens(), 2);
        assert_eq!(transport.closes(), 2);
    }

    #[tokio::test]
    async fn test_keepalive_disabled_closes_after_protocol_error() {
        let transport = MockTransport::new(vec![
            Open::Connect(vec![Exchange::Reply(b"xx:5:PONG\0")]),
            Open::Connect(vec![Exchange::Reply(PONG)]),
        ]);
        let driver = Driver::builder()
            .keepalive(false)
            .transport(Arc::clone(&transport) as Arc<dyn Transport>)
            .build()
            .expect("build driver");

        let err = driver.send(&ping()).await.err().expect("bad frame");
        assert!(err.is_protocol_error());
        assert!(!driver.is_connected().await);
        assert_eq!(transport.closes(), 1);

        // The follow-up send runs its own open/close, not a reuse.
        let reply = driver.send(&ping()).await.expect("retry");
        assert_eq!(reply.text(), "PONG");
        assert_eq!(transport.opens(), 2);
        assert_eq!(transport.closes(), 2);
    }

    /// Full lifecycle: two quick pings reuse the
    /// connection, a ping after the daemon idle-closed fails at the
    /// transport level, reset is a no-op on the already-cleared slot, and
    /// the final ping reopens.
    #[tokio::test]
    async fn test_ping_delay_reset_ping_scenario() {
        let transport = MockTransport::new(vec![
            Open::Connect(vec![
                Exchange::Reply(PONG),
                Exchange::Reply(PONG),
                // Daemon closed the socket during the idle gap; the
                // client's threshold was too generous to notice.
                Exchange::Eof,
            ]),
            Open::Connect(vec![Exchange::Reply(PONG)]),
        ]);
        let driver = driver_with(&transport, Duration::from_secs(30));

        assert_eq!(driver.send(&ping()).await.expect("ping 1").text(), "PONG");
        assert_eq!(driver.send(&ping()).await.expect("ping 2").text(), "PONG");
        assert_eq!(transport.opens(), 1);

        let err = driver.send(&ping()).await.err().expect("ping 3 fails");
        assert!(err.is_transport_error());
        assert!(!driver.is_connected().await);

        driver.reset().await;

        assert_eq!(driver.send(&ping()).await.expect("ping 4").text(), "PONG");
        assert_eq!(transport.opens(), 2);
    }

    #[test]
    fn test_driver_is_clone_and_debug() {
        fn assert_clone<T: Clone>() {}
        fn assert_debug<T: fmt::Debug>() {}
        assert_clone::<Driver>();
        assert_debug::<Driver>();
    }
}
