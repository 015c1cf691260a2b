//! Dynamic instance model.
//!
//! [`EntityInstance`] is what the encoder consumes and the decoder produces:
//! an entity type name plus a map from wire index to [`Value`]. Typed Rust
//! structs reach it through [`WireEntity`](crate::visitor::WireEntity).

use crate::schema::{FloatWidth, ValueKind};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// One dynamically typed field value.
///
/// Integers have two carriers so both full `i64` and full `u64` ranges are
/// representable. `Int(n)` and `UInt(m)` compare equal when they denote the
/// same number; the decoder emits `Int` for signed kinds and `UInt` for
/// unsigned ones.
#[derive(Debug, Clone)]
pub enum Value {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Homogeneous list.
    Sequence(Vec<Value>),
    /// Nested entity.
    Entity(EntityInstance),
    /// Present or absent optional.
    Optional(Option<Box<Value>>),
}

impl Value {
    /// Short name of the variant, for mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "sequence",
            Self::Entity(_) => "entity",
            Self::Optional(_) => "optional",
        }
    }

    /// An absent optional.
    pub const fn absent() -> Self {
        Self::Optional(None)
    }

    /// A present optional wrapping `value`.
    pub fn present(value: impl Into<Value>) -> Self {
        Self::Optional(Some(Box::new(value.into())))
    }

    /// The zero value of a non-entity kind: zero, false, empty or absent.
    ///
    /// Entity kinds have no context-free default; the decoder builds those
    /// from the referenced schema.
    pub fn default_for(kind: &ValueKind) -> Option<Self> {
        Some(match kind {
            ValueKind::Integer { signed: true, .. } => Self::Int(0),
            ValueKind::Integer { signed: false, .. } => Self::UInt(0),
            ValueKind::Float(FloatWidth::F32) => Self::F32(0.0),
            ValueKind::Float(FloatWidth::F64) => Self::F64(0.0),
            ValueKind::Bool => Self::Bool(false),
            ValueKind::String => Self::String(String::new()),
            ValueKind::Bytes => Self::Bytes(Vec::new()),
            ValueKind::Sequence(_) => Self::Sequence(Vec::new()),
            ValueKind::Optional(_) => Self::Optional(None),
            ValueKind::Entity(_) => return None,
        })
    }

    /// The value as an `i128`, if it is an integer.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Int(value) => Some(i128::from(*value)),
            Self::UInt(value) => Some(i128::from(*value)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(_) | Self::UInt(_), Self::Int(_) | Self::UInt(_)) => {
                self.as_integer() == other.as_integer()
            }
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits() || a == b,
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits() || a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => a == b,
            (Self::Optional(a), Self::Optional(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident via $conv:expr;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant($conv(value))
                }
            }
        )*
    };
}

value_from! {
    i8 => Int via i64::from;
    i16 => Int via i64::from;
    i32 => Int via i64::from;
    i64 => Int via std::convert::identity;
    u8 => UInt via u64::from;
    u16 => UInt via u64::from;
    u32 => UInt via u64::from;
    u64 => UInt via std::convert::identity;
    f32 => F32 via std::convert::identity;
    f64 => F64 via std::convert::identity;
    bool => Bool via std::convert::identity;
    String => String via std::convert::identity;
    &str => String via str::to_owned;
    Vec<Value> => Sequence via std::convert::identity;
    EntityInstance => Entity via std::convert::identity;
}

/// A decoded or to-be-encoded entity: its type name and fields by wire index.
///
/// Optional fields may be omitted entirely; the encoder treats a missing
/// optional as absent, and equality does too.
#[derive(Debug, Clone, Default)]
pub struct EntityInstance {
    entity: String,
    fields: BTreeMap<u32, Value>,
}

impl PartialEq for EntityInstance {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
            && self
                .fields
                .keys()
                .chain(other.fields.keys())
                .all(|index| match (self.fields.get(index), other.fields.get(index)) {
                    (Some(a), Some(b)) => a == b,
                    (Some(only), None) | (None, Some(only)) => matches!(only, Value::Optional(None)),
                    (None, None) => true,
                })
    }
}

impl EntityInstance {
    /// An instance of `entity` with no fields set.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, index: u32, value: impl Into<Value>) -> Self {
        self.set(index, value);
        self
    }

    /// Sets field `index`, returning the previous value.
    pub fn set(&mut self, index: u32, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(index, value.into())
    }

    /// Borrows field `index`.
    pub fn get(&self, index: u32) -> Option<&Value> {
        self.fields.get(&index)
    }

    /// Removes and returns field `index`.
    pub fn take(&mut self, index: u32) -> Option<Value> {
        self.fields.remove(&index)
    }

    /// Returns true if field `index` is set.
    pub fn contains(&self, index: u32) -> bool {
        self.fields.contains_key(&index)
    }

    /// Entity type name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Set fields in ascending index order.
    pub fn fields(&self) -> btree_map::Iter<'_, u32, Value> {
        self.fields.iter()
    }

    /// Number of set fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Owned bytes mapped to the `bytes` kind rather than `seq<u8>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteBuf(pub Vec<u8>);

impl From<Vec<u8>> for ByteBuf {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<ByteBuf> for Value {
    fn from(bytes: ByteBuf) -> Self {
        Self::Bytes(bytes.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_compare_across_carriers() {
        assert_eq!(Value::Int(7), Value::UInt(7));
        assert_ne!(Value::Int(-1), Value::UInt(u64::MAX));
        assert_ne!(Value::Int(1), Value::Bool(true));
    }

    #[test]
    fn defaults_follow_kind() {
        assert_eq!(Value::default_for(&ValueKind::i16()), Some(Value::Int(0)));
        assert_eq!(
            Value::default_for(&ValueKind::sequence(ValueKind::Bool)),
            Some(Value::Sequence(Vec::new()))
        );
        assert_eq!(Value::default_for(&ValueKind::entity("E")), None);
    }

    #[test]
    fn missing_field_equals_absent_optional() {
        let bare = EntityInstance::new("Person").with(0, 7i32);
        assert_eq!(bare, bare.clone().with(2, Value::absent()));
        assert_eq!(bare.clone().with(2, Value::absent()), bare);
        assert_ne!(bare, bare.clone().with(2, Value::present("hi")));
        assert_ne!(bare, bare.clone().with(3, 0u8));
        assert_ne!(bare, EntityInstance::new("Robot").with(0, 7i32));
    }

    #[test]
    fn instance_builder_keeps_index_order() {
        let instance = EntityInstance::new("Person")
            .with(4, 30u8)
            .with(0, 7i32)
            .with(2, Value::present("hi"));
        let order: Vec<u32> = instance.fields().map(|(index, _)| *index).collect();
        assert_eq!(order, [0, 2, 4]);
        assert_eq!(instance.get(2), Some(&Value::present("hi")));
        assert!(!instance.contains(1));
    }
}
