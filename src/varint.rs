//! LEB128 varints.
//!
//! Little-endian base-128: seven payload bits per byte, high bit set on every
//! byte except the last. A `u64` needs at most [`MAX_VARINT_LEN`] bytes.

use crate::error::DecodeError;

/// Longest legal encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7f;

/// Appends `value` to `out`.
pub fn write_u64(out: &mut Vec<u8>, mut value: u64) {
    while value >= u64::from(CONTINUATION) {
        out.push((value as u8 & PAYLOAD) | CONTINUATION);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes `write_u64` emits for `value`.
pub const fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Reads a varint from the front of `input`.
///
/// Returns the value and the number of bytes consumed. Running out of input
/// mid-varint is [`DecodeError::UnexpectedEof`]; a varint longer than ten bytes,
/// or whose tenth byte carries more than the top bit of a `u64`, is
/// [`DecodeError::MalformedVarint`].
pub fn read_u64(input: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value = 0u64;
    for (i, &byte) in input.iter().enumerate() {
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(DecodeError::MalformedVarint);
        }
        value |= u64::from(byte & PAYLOAD) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::eof(input.len() + 1, input.len()))
}
