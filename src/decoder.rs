//! Bytes → entity.
//!
//! Each entity is read by a small state machine:
//!
//! ```text
//! Start → ReadTag ─┬─ known index ──→ Dispatch ─→ ReadTag
//!                  ├─ unknown index → Skip ─────→ ReadTag
//!                  └─ end of input ─→ Finalize
//! ```
//!
//! Any error aborts immediately and the partial instance is dropped.

use crate::codec::{self, EntityDecoder};
use crate::error::DecodeError;
use crate::format::Tag;
use crate::io::WireSource;
use crate::schema::{FieldDescriptor, SchemaDescriptor, SchemaRegistry, ValueKind};
use crate::value::{EntityInstance, Value};
use tracing::{debug, trace};

/// Decodes byte streams into [`EntityInstance`]s against registered schemas.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Decoder<'r> {
    /// A decoder resolving nested entity references through `registry`.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Decodes all of `bytes` as one entity of `schema`.
    pub fn decode(&self, bytes: &[u8], schema: &SchemaDescriptor) -> Result<EntityInstance, DecodeError> {
        let mut source = WireSource::new(bytes);
        let instance = DecodeWalk {
            registry: self.registry,
            depth: 0,
        }
        .entity(schema, &mut source)?;
        debug!(entity = schema.name(), bytes = bytes.len(), fields = instance.len(), "decoded entity");
        Ok(instance)
    }
}

enum State<'s> {
    Start,
    ReadTag,
    Dispatch(Tag, &'s FieldDescriptor),
    Skip(Tag),
    Finalize,
}

struct DecodeWalk<'r> {
    registry: &'r SchemaRegistry,
    depth: usize,
}

impl DecodeWalk<'_> {
    fn enter(&mut self) -> Result<(), DecodeError> {
        let limit = self.registry.config().max_depth;
        if self.depth >= limit {
            return Err(DecodeError::DepthExceeded { limit });
        }
        self.depth += 1;
        Ok(())
    }

    fn entity(&mut self, schema: &SchemaDescriptor, source: &mut WireSource<'_>) -> Result<EntityInstance, DecodeError> {
        self.enter()?;
        let result = self.read_fields(schema, source);
        self.depth -= 1;
        result
    }

    fn read_fields(
        &mut self,
        schema: &SchemaDescriptor,
        source: &mut WireSource<'_>,
    ) -> Result<EntityInstance, DecodeError> {
        let mut instance = EntityInstance::new(schema.name());
        let mut state = State::Start;
        loop {
            state = match state {
                State::Start => State::ReadTag,
                State::ReadTag if source.is_empty() => State::Finalize,
                State::ReadTag => {
                    let tag = source.read_tag()?;
                    match schema.field_by_index(tag.index) {
                        Some(field) => State::Dispatch(tag, field),
                        None => State::Skip(tag),
                    }
                }
                State::Dispatch(tag, field) => {
                    if instance.contains(tag.index) {
                        return Err(DecodeError::DuplicateField(tag.index));
                    }
                    if tag.shape != field.shape() {
                        return Err(DecodeError::WireShapeMismatch {
                            index: tag.index,
                            expected: field.shape(),
                            found: tag.shape,
                        });
                    }
                    let value = codec::decode_field(field, source, self)?;
                    instance.set(tag.index, value);
                    State::ReadTag
                }
                State::Skip(tag) => {
                    trace!(
                        entity = schema.name(),
                        index = tag.index,
                        shape = %tag.shape,
                        "skipping unknown field"
                    );
                    codec::skip_field(tag.shape, source)?;
                    State::ReadTag
                }
                State::Finalize => {
                    self.fill_missing(schema, &mut instance)?;
                    return Ok(instance);
                }
            };
        }
    }

    fn fill_missing(&mut self, schema: &SchemaDescriptor, instance: &mut EntityInstance) -> Result<(), DecodeError> {
        for field in schema.fields() {
            if instance.contains(field.index()) {
                continue;
            }
            let value = match (field.optional(), field.default_present()) {
                (_, true) => {
                    let value = self.default_value(field.kind())?;
                    if field.optional() {
                        Value::present(value)
                    } else {
                        value
                    }
                }
                (true, false) => Value::absent(),
                (false, false) => return Err(DecodeError::MissingRequiredField(field.index())),
            };
            instance.set(field.index(), value);
        }
        Ok(())
    }

    /// Zero value of `kind`; entities get every field defaulted and optionals absent.
    fn default_value(&mut self, kind: &ValueKind) -> Result<Value, DecodeError> {
        let ValueKind::Entity(target) = kind else {
            return Ok(Value::default_for(kind).unwrap_or(Value::absent()));
        };
        let registry = self.registry;
        let schema = registry.resolve(target)?;
        self.enter()?;
        let mut instance = EntityInstance::new(schema.name());
        let result = schema.fields().try_for_each(|field| {
            let value = if field.optional() {
                Value::absent()
            } else {
                self.default_value(field.kind())?
            };
            instance.set(field.index(), value);
            Ok(())
        });
        self.depth -= 1;
        result.map(|()| Value::Entity(instance))
    }
}

impl EntityDecoder for DecodeWalk<'_> {
    fn max_sequence_len(&self) -> u64 {
        self.registry.config().max_sequence_len
    }

    fn decode_entity(&mut self, target: &str, source: &mut WireSource<'_>) -> Result<EntityInstance, DecodeError> {
        let registry = self.registry;
        let schema = registry.resolve(target)?;
        self.entity(schema, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::format::WireShape;
    use crate::schema::{EntityMetadata, FieldMetadata};

    fn person_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::default();
        registry
            .register(
                EntityMetadata::new("Person")
                    .field(0, "id", ValueKind::i32())
                    .optional_field(2, "name", ValueKind::String),
            )
            .expect("person");
        registry
    }

    fn decode(registry: &SchemaRegistry, entity: &str, bytes: &[u8]) -> Result<EntityInstance, DecodeError> {
        let schema = registry.resolve(entity).expect("schema");
        Decoder::new(registry).decode(bytes, schema)
    }

    #[test]
    fn decodes_both_optional_states() {
        let registry = person_registry();
        assert_eq!(
            decode(&registry, "Person", &[0x00, 0x07, 0x14, 0x00]),
            Ok(EntityInstance::new("Person").with(0, 7i32).with(2, Value::absent()))
        );
        assert_eq!(
            decode(&registry, "Person", &[0x00, 0x07, 0x14, 0x01, 0x02, b'h', b'i']),
            Ok(EntityInstance::new("Person").with(0, 7i32).with(2, Value::present("hi")))
        );
        // Omitted entirely also reads as absent.
        assert_eq!(
            decode(&registry, "Person", &[0x00, 0x07]),
            Ok(EntityInstance::new("Person").with(0, 7i32).with(2, Value::absent()))
        );
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let registry = person_registry();
        let bytes = [
            0x0a, 0x02, b'x', b'y', // 1: LEN
            0x00, 0x07, // 0: id
            0x19, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 3: FIXED64
            0x23, 0x01, 0x2a, // 4: OPT_VARINT
        ];
        assert_eq!(
            decode(&registry, "Person", &bytes),
            Ok(EntityInstance::new("Person").with(0, 7i32).with(2, Value::absent()))
        );
    }

    #[test]
    fn structural_violations_are_rejected() {
        let registry = person_registry();
        assert_eq!(
            decode(&registry, "Person", &[0x14, 0x00]),
            Err(DecodeError::MissingRequiredField(0))
        );
        assert_eq!(
            decode(&registry, "Person", &[0x00, 0x07, 0x00, 0x08]),
            Err(DecodeError::DuplicateField(0))
        );
        assert_eq!(
            decode(&registry, "Person", &[0x02, 0x01, 0x07]),
            Err(DecodeError::WireShapeMismatch {
                index: 0,
                expected: WireShape::Varint,
                found: WireShape::Len
            })
        );
        assert_eq!(
            decode(&registry, "Person", &[0x00, 0x07, 0x14, 0x01, 0x05, b'h']),
            Err(DecodeError::eof(5, 1))
        );
        assert_eq!(
            decode(&registry, "Person", &[0x00, 0xff]),
            Err(DecodeError::eof(2, 1))
        );
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let mut registry = SchemaRegistry::default();
        registry
            .register(
                EntityMetadata::new("Point")
                    .field(0, "x", ValueKind::i32())
                    .optional_field(1, "label", ValueKind::String),
            )
            .expect("point");
        registry
            .register(
                EntityMetadata::new("Settings")
                    .with_field(FieldMetadata::new(0, "retries", ValueKind::u8()).with_default())
                    .with_field(FieldMetadata::new(1, "origin", ValueKind::entity("Point")).with_default())
                    .with_field(
                        FieldMetadata::new(2, "tags", ValueKind::sequence(ValueKind::String))
                            .optional()
                            .with_default(),
                    ),
            )
            .expect("settings");

        assert_eq!(
            decode(&registry, "Settings", &[]),
            Ok(EntityInstance::new("Settings")
                .with(0, 0u8)
                .with(1, EntityInstance::new("Point").with(0, 0i32).with(1, Value::absent()))
                .with(2, Value::present(Vec::<Value>::new())))
        );
    }

    #[test]
    fn sequence_envelope_must_be_consumed_exactly() {
        let mut registry = SchemaRegistry::default();
        registry
            .register(EntityMetadata::new("Bag").field(0, "items", ValueKind::sequence(ValueKind::u8())))
            .expect("bag");
        assert_eq!(
            decode(&registry, "Bag", &[0x02, 0x03, 0x02, 0x01, 0x02]),
            Ok(EntityInstance::new("Bag").with(0, vec![Value::UInt(1), Value::UInt(2)]))
        );
        assert_eq!(
            decode(&registry, "Bag", &[0x02, 0x04, 0x01, 0x01, 0x02, 0x03]),
            Err(DecodeError::TrailingBytes(2))
        );
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let node = || EntityMetadata::new("Node").optional_field(0, "next", ValueKind::entity("Node"));
        let mut shallow = SchemaRegistry::new(CodecConfig {
            max_depth: 2,
            ..CodecConfig::default()
        });
        shallow.register(node()).expect("node");

        // Node { next: Node { next: Node { next: absent } } }
        let three = [0x04, 0x01, 0x05, 0x04, 0x01, 0x02, 0x04, 0x00];
        assert_eq!(
            decode(&shallow, "Node", &three),
            Err(DecodeError::DepthExceeded { limit: 2 })
        );

        let mut roomy = SchemaRegistry::default();
        roomy.register(node()).expect("node");
        assert!(decode(&roomy, "Node", &three).is_ok());
    }
}
