//! Position-based read helpers over a complete input buffer.
//!
//! Every helper takes the buffer and a start position and returns what it
//! read together with the position just past it. Decode routines, including
//! caller-supplied ones, are built from these.

use super::marker;
use crate::error::CodecError;

/// Returns the byte at `pos`, if any.
pub fn peek(buf: &[u8], pos: usize) -> Option<u8> {
    buf.get(pos).copied()
}

/// Reads the bytes from `start` up to (not including) the next `delimiter`.
///
/// The returned position is one past the delimiter.
pub fn read_delimited(
    buf: &[u8],
    start: usize,
    delimiter: u8,
) -> Result<(&[u8], usize), CodecError> {
    let rest = buf.get(start..).unwrap_or_default();
    match rest.iter().position(|&b| b == delimiter) {
        Some(len) => Ok((&rest[..len], start + len + 1)),
        None => Err(CodecError::corrupted(
            start,
            format!("missing {:?} delimiter", char::from(delimiter)),
        )),
    }
}

/// Reads a `;`-terminated field starting at `start`.
pub fn read_terminated(buf: &[u8], start: usize) -> Result<(&[u8], usize), CodecError> {
    read_delimited(buf, start, marker::TERMINATOR)
}

/// Reads a decimal length prefix closed by `:`.
pub fn read_length(buf: &[u8], start: usize) -> Result<(usize, usize), CodecError> {
    let (digits, next) = read_delimited(buf, start, marker::LENGTH_SEPARATOR)?;
    Ok((parse_length(digits, start)?, next))
}

fn parse_length(digits: &[u8], offset: usize) -> Result<usize, CodecError> {
    if digits.is_empty() {
        return Err(CodecError::corrupted(offset, "empty length prefix"));
    }
    digits.iter().try_fold(0usize, |acc, &d| {
        if !d.is_ascii_digit() {
            return Err(CodecError::corrupted(offset, "non-digit in length prefix"));
        }
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(usize::from(d - b'0')))
            .ok_or_else(|| CodecError::corrupted(offset, "length prefix overflows"))
    })
}

/// Takes exactly `len` bytes starting at `start`.
pub fn take(buf: &[u8], start: usize, len: usize) -> Result<(&[u8], usize), CodecError> {
    match buf.get(start..).and_then(|rest| rest.get(..len)) {
        Some(payload) => Ok((payload, start + len)),
        None => Err(CodecError::corrupted(
            start,
            format!(
                "need {len} bytes but only {} remaining",
                buf.len().saturating_sub(start)
            ),
        )),
    }
}

/// Reads a `<len>:<payload>` body starting at `start`.
pub fn read_length_prefixed(buf: &[u8], start: usize) -> Result<(&[u8], usize), CodecError> {
    let (len, payload_start) = read_length(buf, start)?;
    take(buf, payload_start, len)
}
