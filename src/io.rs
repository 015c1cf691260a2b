//! Low-level buffer access shared by the encoder and decoder.
//!
//! [`WireSink`] is an append-only byte buffer that tracks its own offset.
//! [`WireSource`] is a bounds-checked cursor over a borrowed slice; every read
//! validates the remaining length first, so a corrupt length prefix can never
//! trigger an allocation larger than the input itself.

use crate::error::DecodeError;
use crate::format::Tag;
use crate::varint;

/// Append-only output buffer for one encode call.
#[derive(Debug, Default)]
pub struct WireSink {
    buf: Vec<u8>,
}

impl WireSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Writes a field tag.
    pub fn write_tag(&mut self, tag: Tag) {
        tag.write(&mut self.buf);
    }

    /// Writes an unsigned varint.
    pub fn write_varint(&mut self, value: u64) {
        varint::write_u64(&mut self.buf, value);
    }

    /// Writes a single raw byte.
    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes with no prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a varint byte length followed by `bytes`.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.write_raw(bytes);
    }

    /// Runs `body` against a scratch sink and writes its output length-prefixed.
    ///
    /// The nested span is fully materialized before anything else is written,
    /// so it always lands contiguously after its prefix.
    pub fn write_enveloped<E>(
        &mut self,
        body: impl FnOnce(&mut WireSink) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut scratch = WireSink::new();
        body(&mut scratch)?;
        self.write_len_prefixed(&scratch.buf);
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the sink, returning the encoded bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked read cursor over an encoded stream.
#[derive(Debug, Clone)]
pub struct WireSource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireSource<'a> {
    /// Creates a cursor at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns true once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Offset of the cursor from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads an unsigned varint.
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let (value, used) = varint::read_u64(&self.buf[self.pos..])?;
        self.pos += used;
        Ok(value)
    }

    /// Reads a field tag.
    pub fn read_tag(&mut self) -> Result<Tag, DecodeError> {
        Tag::from_u64(self.read_varint()?)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Reads exactly `N` bytes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Borrows the next `len` bytes.
    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::eof(len, remaining));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    /// Reads a varint length and borrows that many bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], DecodeError> {
        let declared = self.read_varint()?;
        self.read_exact(usize::try_from(declared).unwrap_or(usize::MAX))
    }

    /// Advances past `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.read_exact(len).map(|_| ())
    }
}
