//! Connection driver module.
//!
//! This module provides the public entry point of the crate.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Keepalived connection driver with `send` and `reset` |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`DriverOptions`] | Timeouts and keepalive settings |
//!
//! # Example
//!
//! ```no_run
//! use dbsync_client::{Command, Driver, Result};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder()
//!     .endpoint("127.0.0.1:1111")
//!     .build()?;
//!
//! let reply = driver.send(&Command::new("PING")).await?;
//! println!("{}", reply.text());
//!
//! driver.reset().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Timeouts and keepalive settings.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::DriverOptions;
