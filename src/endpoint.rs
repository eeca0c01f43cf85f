//! Daemon endpoint address.
//!
//! The daemon is addressed as `host:port`, matching the `dbsync.servers`
//! configuration format of the original extension. The driver holds exactly
//! one endpoint: comma-separated target lists are rejected, multi-host
//! fan-out is out of scope for this crate.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default daemon endpoint, matching the extension's `dbsync.servers` default.
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:1111";

// ============================================================================
// Endpoint
// ============================================================================

/// A single `host:port` daemon address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Hostname or IP address.
    host: String,
    /// TCP port.
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from host and port.
    #[inline]
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the hostname or IP address.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the `host:port` form used for socket connects.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("127.0.0.1", 1111)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Parsing
// ============================================================================

impl FromStr for Endpoint {
    type Err = Error;

    /// Parses a `host:port` string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on an empty host, a missing or unparsable
    /// port, or a comma-separated target list.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.contains(',') {
            return Err(Error::config(format!(
                "Multiple targets are not supported, expected a single host:port, got \"{s}\""
            )));
        }

        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::config(format!("Bad target format \"{s}\", expected host:port")))?;

        if host.is_empty() {
            return Err(Error::config(format!("Empty host in target \"{s}\"")));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| Error::config(format!("Bad port \"{port}\" in target \"{s}\"")))?;

        Ok(Self::new(host, port))
    }
}

// ============================================================================
// Tests
// ============================================================================
