use crate::format::WireShape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit width of an integer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntWidth {
    /// 8 bits.
    W8,
    /// 16 bits.
    W16,
    /// 32 bits.
    W32,
    /// 64 bits.
    W64,
}

impl IntWidth {
    /// Width in bits.
    pub const fn bits(self) -> u8 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    /// Smallest signed value of this width.
    pub const fn signed_min(self) -> i64 {
        i64::MIN >> (64 - self.bits() as u32)
    }

    /// Largest signed value of this width.
    pub const fn signed_max(self) -> i64 {
        i64::MAX >> (64 - self.bits() as u32)
    }

    /// Largest unsigned value of this width.
    pub const fn unsigned_max(self) -> u64 {
        u64::MAX >> (64 - self.bits() as u32)
    }
}

/// Bit width of a floating-point kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatWidth {
    /// IEEE 754 binary32.
    F32,
    /// IEEE 754 binary64.
    F64,
}

/// The closed set of value kinds a field can carry.
///
/// Every codec operation matches on this exhaustively, so adding a kind is a
/// compile-checked change everywhere it matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Varint-encoded integer; signed kinds are sign-extended to 64 bits first.
    Integer {
        /// Declared width.
        width: IntWidth,
        /// Whether negative values are allowed.
        signed: bool,
    },
    /// Fixed-width little-endian float.
    Float(FloatWidth),
    /// One byte, 0 or 1.
    Bool,
    /// Length-prefixed UTF-8.
    String,
    /// Length-prefixed raw bytes.
    Bytes,
    /// Count-prefixed list of elements of the inner kind.
    Sequence(Box<ValueKind>),
    /// A nested entity, referenced by its registered name.
    Entity(String),
    /// Presence byte followed by the inner value iff present.
    Optional(Box<ValueKind>),
}

macro_rules! int_constructors {
    ($($name:ident => $width:ident, $signed:expr;)*) => {
        $(
            #[doc = concat!("Shorthand for the `", stringify!($name), "` integer kind.")]
            pub const fn $name() -> Self {
                Self::Integer { width: IntWidth::$width, signed: $signed }
            }
        )*
    };
}

impl ValueKind {
    int_constructors! {
        i8 => W8, true;
        i16 => W16, true;
        i32 => W32, true;
        i64 => W64, true;
        u8 => W8, false;
        u16 => W16, false;
        u32 => W32, false;
        u64 => W64, false;
    }

    /// Shorthand for a 32-bit float.
    pub const fn f32() -> Self {
        Self::Float(FloatWidth::F32)
    }

    /// Shorthand for a 64-bit float.
    pub const fn f64() -> Self {
        Self::Float(FloatWidth::F64)
    }

    /// A sequence of `inner`.
    pub fn sequence(inner: ValueKind) -> Self {
        Self::Sequence(Box::new(inner))
    }

    /// An optional `inner`.
    pub fn optional(inner: ValueKind) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// A reference to the entity registered as `name`.
    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity(name.into())
    }

    /// The shape of this kind's payload when it is a field's top-level value.
    pub fn wire_shape(&self) -> WireShape {
        match self {
            Self::Integer { .. } | Self::Bool => WireShape::Varint,
            Self::Float(FloatWidth::F32) => WireShape::Fixed32,
            Self::Float(FloatWidth::F64) => WireShape::Fixed64,
            Self::String | Self::Bytes | Self::Sequence(_) | Self::Entity(_) => WireShape::Len,
            Self::Optional(inner) => inner.wire_shape().optional(),
        }
    }

    /// Fewest bytes any value of this kind occupies; bounds sequence allocation.
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Self::Float(FloatWidth::F32) => 4,
            Self::Float(FloatWidth::F64) => 8,
            Self::Integer { .. }
            | Self::Bool
            | Self::String
            | Self::Bytes
            | Self::Sequence(_)
            | Self::Entity(_)
            | Self::Optional(_) => 1,
        }
    }

    /// Calls `visit` with every entity name this kind references.
    pub fn for_each_reference<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Self::Entity(name) => visit(name),
            Self::Sequence(inner) | Self::Optional(inner) => inner.for_each_reference(visit),
            Self::Integer { .. } | Self::Float(_) | Self::Bool | Self::String | Self::Bytes => {}
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer { width, signed } => {
                write!(f, "{}{}", if *signed { "i" } else { "u" }, width.bits())
            }
            Self::Float(FloatWidth::F32) => f.write_str("f32"),
            Self::Float(FloatWidth::F64) => f.write_str("f64"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::Sequence(inner) => write!(f, "seq<{inner}>"),
            Self::Entity(name) => write!(f, "entity<{name}>"),
            Self::Optional(inner) => write!(f, "opt<{inner}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ranges_follow_width() {
        assert_eq!(IntWidth::W8.signed_min(), i64::from(i8::MIN));
        assert_eq!(IntWidth::W8.signed_max(), i64::from(i8::MAX));
        assert_eq!(IntWidth::W32.unsigned_max(), u64::from(u32::MAX));
        assert_eq!(IntWidth::W64.signed_min(), i64::MIN);
        assert_eq!(IntWidth::W64.unsigned_max(), u64::MAX);
    }

    #[test]
    fn shapes_by_kind() {
        assert_eq!(ValueKind::i32().wire_shape(), WireShape::Varint);
        assert_eq!(ValueKind::Bool.wire_shape(), WireShape::Varint);
        assert_eq!(ValueKind::f32().wire_shape(), WireShape::Fixed32);
        assert_eq!(ValueKind::f64().wire_shape(), WireShape::Fixed64);
        assert_eq!(
            ValueKind::sequence(ValueKind::u8()).wire_shape(),
            WireShape::Len
        );
        assert_eq!(
            ValueKind::optional(ValueKind::String).wire_shape(),
            WireShape::OptLen
        );
    }

    #[test]
    fn display_is_canonical() {
        let kind = ValueKind::sequence(ValueKind::optional(ValueKind::entity("Point")));
        assert_eq!(kind.to_string(), "seq<opt<entity<Point>>>");
        assert_eq!(ValueKind::u16().to_string(), "u16");
    }

    #[test]
    fn references_are_found_through_wrappers() {
        let kind = ValueKind::optional(ValueKind::sequence(ValueKind::entity("Node")));
        let mut names = Vec::new();
        kind.for_each_reference(&mut |name| names.push(name));
        assert_eq!(names, ["Node"]);
    }
}
