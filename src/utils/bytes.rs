//! Byte-slice utilities for bounds-oriented parsing.
//!
//! Every decoder in this crate reads its fields through these helpers instead of indexing the
//! buffer directly, so a short or lying resource always surfaces as a [`DecodeError`].
//!
//! There are two layers:
//! - **Option layer** (`read_*`): zero-cost helpers that return `Option<T>`.
//! - **Result layer** (`*_r`): wrappers that map `None` to `DecodeError::OutOfBounds`.
//!
//! Design notes:
//! - All numeric reads are **little-endian** and unaligned.
//! - Offsets are `usize` and are interpreted relative to the slice you pass in.
//! - Prefer a single up-front bounds check with [`slice_r`] when reading counted arrays.
//!
//! ```ignore
//! use crate::utils::bytes;
//!
//! let fmt = bytes::read_u16_le_r(span, 0, "modifier table format")?;
//! let count = bytes::read_u32_le_r(span, 4, "modifier table count")?;
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::err::DecodeError;

/// Read a `u16` (little-endian) at `offset`.
pub(crate) fn read_u16_le(buf: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    buf.get(offset..end).map(LittleEndian::read_u16)
}

/// Read a `u32` (little-endian) at `offset`.
pub(crate) fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    buf.get(offset..end).map(LittleEndian::read_u32)
}

#[inline]
fn out_of_bounds(what: &'static str, offset: usize, need: usize, len: usize) -> DecodeError {
    DecodeError::OutOfBounds {
        what,
        offset,
        need,
        have: len.saturating_sub(offset),
    }
}

/// Borrow `len` bytes at `offset`, or return `DecodeError::OutOfBounds`.
pub(crate) fn slice_r<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], DecodeError> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| out_of_bounds(what, offset, len, buf.len()))?;
    buf.get(offset..end)
        .ok_or_else(|| out_of_bounds(what, offset, len, buf.len()))
}

/// Borrow everything from `offset` to the end of `buf`.
///
/// `offset == buf.len()` is allowed and yields an empty span.
pub(crate) fn tail_r<'a>(
    buf: &'a [u8],
    offset: usize,
    what: &'static str,
) -> Result<&'a [u8], DecodeError> {
    buf.get(offset..)
        .ok_or_else(|| out_of_bounds(what, offset, 0, buf.len()))
}

/// Position of `inner` within `outer`, if `inner` is a sub-slice of it.
pub(crate) fn offset_within(outer: &[u8], inner: &[u8]) -> Option<usize> {
    let outer_start = outer.as_ptr() as usize;
    let inner_start = inner.as_ptr() as usize;
    let offset = inner_start.checked_sub(outer_start)?;
    (offset.checked_add(inner.len())? <= outer.len()).then_some(offset)
}

/// Read a `u16` (little-endian) at `offset`, or return `DecodeError::OutOfBounds`.
pub(crate) fn read_u16_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u16, DecodeError> {
    read_u16_le(buf, offset).ok_or_else(|| out_of_bounds(what, offset, 2, buf.len()))
}

/// Read a `u32` (little-endian) at `offset`, or return `DecodeError::OutOfBounds`.
pub(crate) fn read_u32_le_r(
    buf: &[u8],
    offset: usize,
    what: &'static str,
) -> Result<u32, DecodeError> {
    read_u32_le(buf, offset).ok_or_else(|| out_of_bounds(what, offset, 4, buf.len()))
}

/// Ensure a counted array of `count` elements of `width` bytes fits at `offset`.
///
/// Unlike the single-field readers this reports `DecodeError::MalformedTable`: the fields were
/// readable, but the count they declare cannot be satisfied by the span.
pub(crate) fn require_table(
    buf: &[u8],
    offset: usize,
    count: usize,
    width: usize,
    what: &'static str,
) -> Result<(), DecodeError> {
    let malformed = || DecodeError::MalformedTable {
        what,
        offset,
        count,
    };
    let bytes = count.checked_mul(width).ok_or_else(malformed)?;
    let end = offset.checked_add(bytes).ok_or_else(malformed)?;
    if end > buf.len() {
        return Err(malformed());
    }
    Ok(())
}

/// Read a `count`-element `u16` (little-endian) table at `offset`.
///
/// This does a single bounds check for the whole table and then reads each element.
pub(crate) fn read_u16_vec_le_r(
    buf: &[u8],
    offset: usize,
    count: usize,
    what: &'static str,
) -> Result<Vec<u16>, DecodeError> {
    require_table(buf, offset, count, 2, what)?;

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(read_u16_le_r(buf, offset + i * 2, what)?);
    }
    Ok(out)
}

/// Read a `count`-element `u32` (little-endian) table at `offset`.
pub(crate) fn read_u32_vec_le_r(
    buf: &[u8],
    offset: usize,
    count: usize,
    what: &'static str,
) -> Result<Vec<u32>, DecodeError> {
    require_table(buf, offset, count, 4, what)?;

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(read_u32_le_r(buf, offset + i * 4, what)?);
    }
    Ok(out)
}
