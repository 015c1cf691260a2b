//! Defines the physical layout of a Tagcode stream.
//!
//! # Layout
//! A stream is a flat sequence of fields, each occupying one contiguous span:
//!
//! `[Tag] [Payload] [Tag] [Payload] ...`
//!
//! No header, trailer, length or checksum wraps the stream; message framing is
//! the transport's job.
//!
//! ## Tag Anatomy
//! A tag is a single varint packing the field's wire index and the shape of its
//! payload:
//!
//! `tag = (index << 3) | shape`
//!
//! The shape is what lets a decoder skip fields it has no descriptor for.

use crate::error::DecodeError;
use crate::varint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest wire index representable in a tag. `index << 3` must fit in a `u32`.
pub const MAX_FIELD_INDEX: u32 = (1 << 29) - 1;

/// Presence byte written for an absent optional.
pub const ABSENT: u8 = 0;

/// Presence byte written for a present optional.
pub const PRESENT: u8 = 1;

/// How a field payload is delimited on the wire (low 3 bits of the tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireShape {
    /// One varint. Integers and booleans.
    Varint,
    /// Eight little-endian bytes.
    Fixed64,
    /// Varint byte length followed by that many bytes.
    Len,
    /// Presence byte, then a [`WireShape::Varint`] payload iff present.
    OptVarint,
    /// Presence byte, then a [`WireShape::Len`] payload iff present.
    OptLen,
    /// Four little-endian bytes.
    Fixed32,
    /// Presence byte, then a [`WireShape::Fixed64`] payload iff present.
    OptFixed64,
    /// Presence byte, then a [`WireShape::Fixed32`] payload iff present.
    OptFixed32,
}

impl WireShape {
    const MASK: u64 = 0b111;

    /// The 3-bit code stored in the tag.
    pub const fn code(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::Len => 2,
            Self::OptVarint => 3,
            Self::OptLen => 4,
            Self::Fixed32 => 5,
            Self::OptFixed64 => 6,
            Self::OptFixed32 => 7,
        }
    }

    /// Decodes a 3-bit code. Every code is assigned, so this is total.
    pub const fn from_code(code: u8) -> Self {
        match code & 0b111 {
            0 => Self::Varint,
            1 => Self::Fixed64,
            2 => Self::Len,
            3 => Self::OptVarint,
            4 => Self::OptLen,
            5 => Self::Fixed32,
            6 => Self::OptFixed64,
            _ => Self::OptFixed32,
        }
    }

    /// The presence-prefixed variant of a plain shape.
    ///
    /// Already optional shapes are returned unchanged.
    pub const fn optional(self) -> Self {
        match self {
            Self::Varint => Self::OptVarint,
            Self::Fixed64 => Self::OptFixed64,
            Self::Len => Self::OptLen,
            Self::Fixed32 => Self::OptFixed32,
            other => other,
        }
    }

    /// For presence-prefixed shapes, the shape that follows a present byte.
    pub const fn inner(self) -> Option<Self> {
        match self {
            Self::OptVarint => Some(Self::Varint),
            Self::OptFixed64 => Some(Self::Fixed64),
            Self::OptLen => Some(Self::Len),
            Self::OptFixed32 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// Returns true if the payload starts with a presence byte.
    pub const fn is_optional(self) -> bool {
        self.inner().is_some()
    }
}

impl fmt::Display for WireShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Varint => "VARINT",
            Self::Fixed64 => "FIXED64",
            Self::Len => "LEN",
            Self::OptVarint => "OPT_VARINT",
            Self::OptLen => "OPT_LEN",
            Self::Fixed32 => "FIXED32",
            Self::OptFixed64 => "OPT_FIXED64",
            Self::OptFixed32 => "OPT_FIXED32",
        };
        f.write_str(name)
    }
}

/// A decoded field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// The field's wire index.
    pub index: u32,
    /// How the payload that follows is delimited.
    pub shape: WireShape,
}

impl Tag {
    /// Creates a new Tag.
    pub const fn new(index: u32, shape: WireShape) -> Self {
        Self { index, shape }
    }

    /// The raw varint value of this tag.
    pub const fn as_u64(&self) -> u64 {
        ((self.index as u64) << 3) | self.shape.code() as u64
    }

    /// Splits a raw tag value.
    ///
    /// Indices beyond `u32` cannot come from a conforming encoder and are
    /// reported as [`DecodeError::MalformedVarint`].
    pub fn from_u64(raw: u64) -> Result<Self, DecodeError> {
        let index = u32::try_from(raw >> 3).map_err(|_| DecodeError::MalformedVarint)?;
        let shape = WireShape::from_code((raw & WireShape::MASK) as u8);
        Ok(Self { index, shape })
    }

    /// Appends the varint form of this tag to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        varint::write_u64(out, self.as_u64());
    }
}
