//! Wire protocol message types and framing.
//!
//! The daemon speaks a plain-text framed protocol. Every message in either
//! direction is one frame:
//!
//! ```text
//! ds:<len>:<payload>
//! ```
//!
//! where `<len>` is the decimal byte length of `<payload>`. Request payloads
//! carry a trailing NUL after the command line; replies may or may not,
//! depending on the daemon build, so the decoder tolerates both.
//!
//! # Message Types
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | [`Command`] | Client → Daemon | Command name plus arguments |
//! | [`Reply`] | Daemon → Client | Text result payload |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command and reply value types |
//! | `frame` | Frame encoding, incremental sizing, decoding |

// ============================================================================
// Submodules
// ============================================================================

/// Command and reply value types.
pub mod command;

/// Frame codec for the `ds:<len>:<payload>` wire format.
pub mod frame;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, Reply};
