//! Frame codec for the `ds:<len>:<payload>` wire format.
//!
//! The length field is decimal ASCII and counts payload bytes only. Request
//! payloads are the command line plus a trailing NUL. Because replies arrive
//! in chunks, [`expected_len`] supports incremental sizing: it distinguishes
//! "need more bytes" from "malformed header" so the read loop can stop as
//! soon as the frame is either complete or provably garbage.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::protocol::{Command, Reply};

// ============================================================================
// Constants
// ============================================================================

/// Frame tag shared by both directions.
const TAG: &[u8] = b"ds";

/// Maximum digits in the length field.
const MAX_LEN_DIGITS: usize = 10;

/// Smallest parsable frame prefix: tag, two separators, one length digit.
const MIN_HEADER: usize = TAG.len() + 3;

// ============================================================================
// Encoding
// ============================================================================

/// Encodes a command into one wire frame.
///
/// The payload is the command line followed by a NUL terminator, which the
/// daemon expects as part of the counted payload bytes.
#[must_use]
pub fn encode(command: &Command) -> Vec<u8> {
    let line = command.line();
    let payload_len = line.len() + 1;

    let mut frame = Vec::with_capacity(TAG.len() + 2 + MAX_LEN_DIGITS + payload_len);
    frame.extend_from_slice(TAG);
    frame.push(b':');
    frame.extend_from_slice(payload_len.to_string().as_bytes());
    frame.push(b':');
    frame.extend_from_slice(line.as_bytes());
    frame.push(0);
    frame
}

// ============================================================================
// Incremental Sizing
// ============================================================================

/// Determines the total frame size from a partial buffer.
///
/// Returns `Ok(None)` when more bytes are needed to parse the header, and
/// `Ok(Some(total))` once the length field is complete, where `total` is the
/// full frame size including header.
///
/// # Errors
///
/// Returns [`Error::Protocol`] when the buffer cannot be the prefix of a
/// well-formed frame: wrong tag, oversized or non-numeric length field.
pub fn expected_len(buf: &[u8]) -> Result<Option<usize>> {
    if buf.len() < MIN_HEADER {
        return Ok(None);
    }

    if &buf[..TAG.len()] != TAG || buf[TAG.len()] != b':' {
        return Err(Error::protocol("Wrong frame tag"));
    }

    let digits_start = TAG.len() + 1;
    let digits_end = match buf[digits_start..].iter().position(|&b| b == b':') {
        Some(pos) => digits_start + pos,
        None => {
            if buf.len() - digits_start > MAX_LEN_DIGITS {
                return Err(Error::protocol("Length field is not terminated"));
            }
            return Ok(None);
        }
    };

    let digits = &buf[digits_start..digits_end];
    if digits.is_empty() || digits.len() > MAX_LEN_DIGITS {
        return Err(Error::protocol("Bad length field size"));
    }

    let mut payload_len: usize = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(Error::protocol("Non-numeric length field"));
        }
        payload_len = payload_len * 10 + usize::from(b - b'0');
    }

    Ok(Some(digits_end + 1 + payload_len))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes one complete reply frame.
///
/// The buffer must contain exactly one frame; trailing bytes beyond the
/// declared length are a protocol violation. A single trailing NUL in the
/// payload is stripped, matching how request payloads are counted.
///
/// # Errors
///
/// Returns [`Error::Protocol`] on a malformed header, a size mismatch, or a
/// payload that is not valid UTF-8.
pub fn decode(buf: &[u8]) -> Result<Reply> {
    let total = expected_len(buf)?
        .ok_or_else(|| Error::protocol(format!("Truncated frame of {} bytes", buf.len())))?;

    if buf.len() != total {
        return Err(Error::protocol(format!(
            "Frame size mismatch: expected {total} bytes, got {}",
            buf.len()
        )));
    }

    let payload = &buf[total - payload_len_of(buf, total)..];
    let payload = match payload.split_last() {
        Some((&0, head)) => head,
        _ => payload,
    };

    let text = std::str::from_utf8(payload)
        .map_err(|_| Error::protocol("Reply payload is not valid UTF-8"))?;

    Ok(Reply::new(text))
}

/// Payload length implied by a buffer whose total size is already known.
fn payload_len_of(buf: &[u8], total: usize) -> usize {
    // Header is tag + ':' + digits + ':'; everything after it is payload.
    let digits_start = TAG.len() + 1;
    let digits_len = buf[digits_start..]
        .iter()
        .position(|&b| b == b':')
        .unwrap_or(0);
    total - (digits_start + digits_len + 1)
}

// ============================================================================
// Tests
// ============================================================================
