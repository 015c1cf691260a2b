//! Entity → bytes.

use crate::codec::{self, EntityEncoder, FieldPath};
use crate::error::EncodeError;
use crate::io::WireSink;
use crate::schema::{SchemaDescriptor, SchemaRegistry, ValueKind};
use crate::value::EntityInstance;
use tracing::debug;

/// Encodes [`EntityInstance`]s against registered schemas.
///
/// Holds only a shared borrow of the registry; one encoder can serve any
/// number of calls, and each call owns its output buffer.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Encoder<'r> {
    /// An encoder resolving nested entity references through `registry`.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Encodes `instance` as an entity of `schema`.
    ///
    /// Fields are written in ascending index order. On error no bytes are returned.
    pub fn encode(&self, instance: &EntityInstance, schema: &SchemaDescriptor) -> Result<Vec<u8>, EncodeError> {
        let mut sink = WireSink::with_capacity(schema.len() * 4);
        self.encode_into(instance, schema, &mut sink)?;
        debug!(entity = schema.name(), bytes = sink.len(), "encoded entity");
        Ok(sink.into_inner())
    }

    /// Appends the encoding of `instance` to `sink`.
    ///
    /// On error `sink` may hold a partial entity; discard it.
    pub fn encode_into(
        &self,
        instance: &EntityInstance,
        schema: &SchemaDescriptor,
        sink: &mut WireSink,
    ) -> Result<(), EncodeError> {
        let mut walk = EncodeWalk {
            registry: self.registry,
            depth: 0,
        };
        walk.entity(schema, instance, sink)
    }
}

struct EncodeWalk<'r> {
    registry: &'r SchemaRegistry,
    depth: usize,
}

impl EncodeWalk<'_> {
    fn entity(
        &mut self,
        schema: &SchemaDescriptor,
        instance: &EntityInstance,
        sink: &mut WireSink,
    ) -> Result<(), EncodeError> {
        let limit = self.registry.config().max_depth;
        if self.depth >= limit {
            return Err(EncodeError::DepthExceeded { limit });
        }
        if instance.entity() != schema.name() {
            return Err(EncodeError::TypeMismatch {
                path: schema.name().to_owned(),
                expected: ValueKind::entity(schema.name()).to_string(),
                found: ValueKind::entity(instance.entity()).to_string(),
            });
        }
        if let Some((&index, _)) = instance
            .fields()
            .find(|(index, _)| schema.field_by_index(**index).is_none())
        {
            return Err(EncodeError::UnknownField {
                entity: schema.name().to_owned(),
                index,
            });
        }

        self.depth += 1;
        let result = schema.fields().try_for_each(|field| {
            let value = instance.get(field.index());
            let path = FieldPath {
                entity: schema.name(),
                index: field.index(),
            };
            codec::encode_field(field, value, path, sink, &mut *self)
        });
        self.depth -= 1;
        result
    }
}

impl EntityEncoder for EncodeWalk<'_> {
    fn encode_entity(
        &mut self,
        target: &str,
        instance: &EntityInstance,
        sink: &mut WireSink,
    ) -> Result<(), EncodeError> {
        let registry = self.registry;
        let schema = registry.resolve(target)?;
        self.entity(schema, instance, sink)
    }
}
