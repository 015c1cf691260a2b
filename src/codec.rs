//! The type codec: how one value of each [`ValueKind`] is written, read and skipped.
//!
//! Every function here matches on the kind or shape exhaustively. Nested
//! entities are the one case the codec cannot finish alone; it frames them and
//! hands the inner stream to an [`EntityEncoder`] / [`EntityDecoder`], which is
//! where the recursion depth is tracked.

use crate::error::{DecodeError, EncodeError};
use crate::format::{ABSENT, PRESENT, Tag, WireShape};
use crate::io::{WireSink, WireSource};
use crate::schema::{FieldDescriptor, FloatWidth, ValueKind};
use crate::value::{EntityInstance, Value};
use std::fmt;

/// Location of a value inside an entity, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath<'a> {
    /// Entity type name.
    pub entity: &'a str,
    /// Wire index of the field.
    pub index: u32,
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity, self.index)
    }
}

/// Writes the body of a nested entity. The codec adds the length prefix.
pub trait EntityEncoder {
    /// Encodes `instance` as an entity of type `target` into `sink`.
    fn encode_entity(
        &mut self,
        target: &str,
        instance: &EntityInstance,
        sink: &mut WireSink,
    ) -> Result<(), EncodeError>;
}

/// Reads the body of a nested entity from an already delimited span.
pub trait EntityDecoder {
    /// Largest element count a sequence may declare.
    fn max_sequence_len(&self) -> u64;

    /// Decodes all of `source` as an entity of type `target`.
    fn decode_entity(
        &mut self,
        target: &str,
        source: &mut WireSource<'_>,
    ) -> Result<EntityInstance, DecodeError>;
}

fn mismatch(path: FieldPath<'_>, expected: &ValueKind, found: impl Into<String>) -> EncodeError {
    EncodeError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.into(),
    }
}

/// Writes one value of `kind` with no tag.
pub fn encode_value(
    kind: &ValueKind,
    value: &Value,
    path: FieldPath<'_>,
    sink: &mut WireSink,
    entities: &mut impl EntityEncoder,
) -> Result<(), EncodeError> {
    match (kind, value) {
        (ValueKind::Integer { width, signed }, Value::Int(_) | Value::UInt(_)) => {
            let number = value.as_integer().unwrap_or_default();
            let (min, max) = if *signed {
                (i128::from(width.signed_min()), i128::from(width.signed_max()))
            } else {
                (0, i128::from(width.unsigned_max()))
            };
            if number < min || number > max {
                return Err(mismatch(path, kind, format!("{number} (out of range)")));
            }
            // Range-checked above. Signed values are sign-extended to 64 bits.
            if *signed {
                sink.write_varint(number as i64 as u64);
            } else {
                sink.write_varint(number as u64);
            }
        }
        (ValueKind::Float(FloatWidth::F32), Value::F32(number)) => sink.write_raw(&number.to_le_bytes()),
        (ValueKind::Float(FloatWidth::F64), Value::F64(number)) => sink.write_raw(&number.to_le_bytes()),
        (ValueKind::Bool, Value::Bool(flag)) => sink.write_u8(u8::from(*flag)),
        (ValueKind::String, Value::String(text)) => sink.write_len_prefixed(text.as_bytes()),
        (ValueKind::Bytes, Value::Bytes(bytes)) => sink.write_len_prefixed(bytes),
        (ValueKind::Sequence(inner), Value::Sequence(items)) => {
            sink.write_varint(items.len() as u64);
            for item in items {
                encode_value(inner, item, path, sink, entities)?;
            }
        }
        (ValueKind::Entity(target), Value::Entity(instance)) => {
            sink.write_enveloped(|body| entities.encode_entity(target, instance, body))?;
        }
        (ValueKind::Optional(_), Value::Optional(None)) => sink.write_u8(ABSENT),
        (ValueKind::Optional(inner), Value::Optional(Some(present))) => {
            sink.write_u8(PRESENT);
            encode_value(inner, present, path, sink, entities)?;
        }
        _ => return Err(mismatch(path, kind, value.type_name())),
    }
    Ok(())
}

/// Reads one value of `kind`.
pub fn decode_value(
    kind: &ValueKind,
    source: &mut WireSource<'_>,
    entities: &mut impl EntityDecoder,
) -> Result<Value, DecodeError> {
    Ok(match kind {
        ValueKind::Integer { width, signed: true } => {
            let number = source.read_varint()? as i64;
            if number < width.signed_min() || number > width.signed_max() {
                return Err(DecodeError::IntegerOverflow {
                    width: width.bits(),
                    signed: true,
                });
            }
            Value::Int(number)
        }
        ValueKind::Integer { width, signed: false } => {
            let number = source.read_varint()?;
            if number > width.unsigned_max() {
                return Err(DecodeError::IntegerOverflow {
                    width: width.bits(),
                    signed: false,
                });
            }
            Value::UInt(number)
        }
        ValueKind::Float(FloatWidth::F32) => Value::F32(f32::from_le_bytes(source.read_array()?)),
        ValueKind::Float(FloatWidth::F64) => Value::F64(f64::from_le_bytes(source.read_array()?)),
        ValueKind::Bool => match source.read_u8()? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => return Err(DecodeError::InvalidBool(other)),
        },
        ValueKind::String => {
            let bytes = source.read_len_prefixed()?;
            let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
            Value::String(text.to_owned())
        }
        ValueKind::Bytes => Value::Bytes(source.read_len_prefixed()?.to_vec()),
        ValueKind::Sequence(inner) => {
            let declared = source.read_varint()?;
            let remaining = source.remaining();
            let fits = declared
                .checked_mul(inner.min_encoded_len() as u64)
                .is_some_and(|needed| needed <= remaining as u64);
            if !fits || declared > entities.max_sequence_len() {
                return Err(DecodeError::LengthExceedsBuffer {
                    declared,
                    remaining,
                });
            }
            // Bounded by `remaining` above.
            let count = declared as usize;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(decode_value(inner, source, entities)?);
            }
            Value::Sequence(items)
        }
        ValueKind::Entity(target) => {
            let mut nested = WireSource::new(source.read_len_prefixed()?);
            Value::Entity(entities.decode_entity(target, &mut nested)?)
        }
        ValueKind::Optional(inner) => match read_presence(source)? {
            false => Value::Optional(None),
            true => Value::Optional(Some(Box::new(decode_value(inner, source, entities)?))),
        },
    })
}

fn read_presence(source: &mut WireSource<'_>) -> Result<bool, DecodeError> {
    match source.read_u8()? {
        ABSENT => Ok(false),
        PRESENT => Ok(true),
        other => Err(DecodeError::InvalidPresence(other)),
    }
}

/// Writes a complete field: tag, presence byte for optionals, then the payload.
///
/// `value` is `None` when the instance does not carry the field; for optional
/// fields that writes an explicit absence, for required ones it is
/// [`EncodeError::MissingRequiredField`] whether or not the field has a default.
pub fn encode_field(
    field: &FieldDescriptor,
    value: Option<&Value>,
    path: FieldPath<'_>,
    sink: &mut WireSink,
    entities: &mut impl EntityEncoder,
) -> Result<(), EncodeError> {
    sink.write_tag(Tag::new(field.index(), field.shape()));
    if !field.optional() {
        return match value {
            Some(value) => encode_payload(field.kind(), value, path, sink, entities),
            None => Err(EncodeError::MissingRequiredField {
                entity: path.entity.to_owned(),
                index: field.index(),
            }),
        };
    }
    match value {
        None | Some(Value::Optional(None)) => {
            sink.write_u8(ABSENT);
            Ok(())
        }
        Some(Value::Optional(Some(present))) => {
            sink.write_u8(PRESENT);
            encode_payload(field.kind(), present, path, sink, entities)
        }
        Some(other) => Err(mismatch(
            path,
            &ValueKind::optional(field.kind().clone()),
            other.type_name(),
        )),
    }
}

fn encode_payload(
    kind: &ValueKind,
    value: &Value,
    path: FieldPath<'_>,
    sink: &mut WireSink,
    entities: &mut impl EntityEncoder,
) -> Result<(), EncodeError> {
    match kind {
        ValueKind::Sequence(_) => {
            sink.write_enveloped(|body| encode_value(kind, value, path, body, entities))
        }
        _ => encode_value(kind, value, path, sink, entities),
    }
}

/// Reads a field payload whose tag has already been consumed and checked.
pub fn decode_field(
    field: &FieldDescriptor,
    source: &mut WireSource<'_>,
    entities: &mut impl EntityDecoder,
) -> Result<Value, DecodeError> {
    if !field.optional() {
        return decode_payload(field.kind(), source, entities);
    }
    Ok(match read_presence(source)? {
        false => Value::Optional(None),
        true => Value::Optional(Some(Box::new(decode_payload(
            field.kind(),
            source,
            entities,
        )?))),
    })
}

fn decode_payload(
    kind: &ValueKind,
    source: &mut WireSource<'_>,
    entities: &mut impl EntityDecoder,
) -> Result<Value, DecodeError> {
    match kind {
        ValueKind::Sequence(_) => {
            let mut span = WireSource::new(source.read_len_prefixed()?);
            let value = decode_value(kind, &mut span, entities)?;
            match span.remaining() {
                0 => Ok(value),
                left => Err(DecodeError::TrailingBytes(left)),
            }
        }
        _ => decode_value(kind, source, entities),
    }
}

/// Advances past one field payload using only its wire shape.
pub fn skip_field(shape: WireShape, source: &mut WireSource<'_>) -> Result<(), DecodeError> {
    match shape {
        WireShape::Varint => source.read_varint().map(|_| ()),
        WireShape::Fixed64 => source.skip(8),
        WireShape::Fixed32 => source.skip(4),
        WireShape::Len => source.read_len_prefixed().map(|_| ()),
        WireShape::OptVarint | WireShape::OptLen | WireShape::OptFixed64 | WireShape::OptFixed32 => {
            if !read_presence(source)? {
                return Ok(());
            }
            match shape.inner() {
                Some(inner) => skip_field(inner, source),
                None => Ok(()),
            }
        }
    }
}
