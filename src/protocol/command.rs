//! Command and reply value types.
//!
//! Both are immutable values: a [`Command`] is constructed per call and never
//! persisted, a [`Reply`] is handed back to the caller as-is.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Command
// ============================================================================

/// A command sent to the daemon: a name plus optional arguments.
///
/// The wire form is the name and arguments joined by single spaces, e.g.
/// `PING` or `SYNC users 42`.
///
/// # Example
///
/// ```
/// use dbsync_client::Command;
///
/// let cmd = Command::new("SYNC").arg("users").arg("42");
/// assert_eq!(cmd.line(), "SYNC users 42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name, e.g. `PING`.
    name: String,
    /// Optional positional arguments.
    args: Vec<String>,
}

impl Command {
    /// Creates a command with no arguments.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[inline]
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the command name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the command line as sent on the wire (without framing).
    #[must_use]
    pub fn line(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }

        let mut line = self.name.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())
    }
}

// ============================================================================
// Reply
// ============================================================================

/// A reply received from the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply payload with framing and trailing NUL stripped.
    text: String,
}

impl Reply {
    /// Creates a reply from decoded payload text.
    #[inline]
    #[must_use]
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the reply text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the reply, returning the owned text.
    #[inline]
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Tests
// ============================================================================
