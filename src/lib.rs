//! dbsync client - keepalived driver for the dbsync synchronization daemon.
//!
//! This library maintains a single long-lived TCP connection to a `dbsyncd`
//! daemon, sends framed text commands, and recovers cleanly when the daemon
//! idle-closes the socket.
//!
//! # Architecture
//!
//! Key design principles:
//!
//! - One [`Driver`] owns zero-or-one connection, opened lazily on first use
//! - Staleness is decided before each send from the last-activity timestamp,
//!   never discovered through a hanging write
//! - [`Driver::reset`] tears the connection down; the next send reopens
//! - The driver never retries within a call; after any transport failure the
//!   next `send` starts from a fresh connection
//!
//! # Quick Start
//!
//! ```no_run
//! use dbsync_client::{Command, Driver, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = Driver::builder()
//!         .endpoint("127.0.0.1:1111")
//!         .build()?;
//!
//!     let reply = driver.send(&Command::new("PING")).await?;
//!     println!("daemon says: {}", reply.text());
//!
//!     driver.reset().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`driver`] | [`Driver`], builder, and options |
//! | [`endpoint`] | `host:port` daemon address |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`keepalive`] | Staleness tracking |
//! | [`protocol`] | Command/reply types and wire framing |
//! | [`session`] | The zero-or-one connection slot |
//! | [`transport`] | Transport seam and TCP implementation |

// ============================================================================
// Modules
// ============================================================================

/// Connection driver: the public entry point.
pub mod driver;

/// Daemon endpoint address.
pub mod endpoint;

/// Error types and result aliases.
pub mod error;

/// Keepalive staleness tracking.
pub mod keepalive;

/// Wire protocol message types and framing.
pub mod protocol;

/// Session state: the driver's connection slot.
pub mod session;

/// Transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Driver types
pub use driver::{Driver, DriverBuilder, DriverOptions};

// Endpoint
pub use endpoint::Endpoint;

// Error types
pub use error::{Error, Result};

// Keepalive
pub use keepalive::KeepaliveTracker;

// Protocol types
pub use protocol::{Command, Reply};

// Transport seam, for custom transports and tests
pub use transport::{Connection, TcpTransport, Transport, TransportStream};
