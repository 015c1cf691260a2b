use super::kind::ValueKind;
use super::metadata::EntityMetadata;
use crate::error::SchemaError;
use crate::format::{MAX_FIELD_INDEX, WireShape};
use std::collections::HashMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// A validated field of a registered entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    index: u32,
    name: String,
    kind: ValueKind,
    optional: bool,
    default_present: bool,
}

impl FieldDescriptor {
    /// Wire index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value kind. Never `Optional` at the top level; see [`optional`](Self::optional).
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Whether the payload starts with a presence byte.
    pub fn optional(&self) -> bool {
        self.optional
    }

    /// Whether a missing field decodes to its kind's default.
    pub fn default_present(&self) -> bool {
        self.default_present
    }

    /// Whether decoding fails when the field is missing.
    pub fn is_required(&self) -> bool {
        !self.optional && !self.default_present
    }

    /// Shape written into this field's tag.
    pub fn shape(&self) -> WireShape {
        let shape = self.kind.wire_shape();
        if self.optional { shape.optional() } else { shape }
    }
}

/// The immutable, validated layout of one entity type.
///
/// Fields are held in ascending index order, the canonical on-wire order.
/// Shared as `Arc<SchemaDescriptor>` and never mutated after registration.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    by_index: HashMap<u32, usize>,
    positions: Vec<u32>,
    fingerprint: u64,
}

impl SchemaDescriptor {
    /// Validates `metadata` and builds the lookup tables.
    ///
    /// Entity references are not resolved here; that needs the registry.
    pub(crate) fn build(metadata: &EntityMetadata, max_index: u32) -> Result<Self, SchemaError> {
        let max = max_index.min(MAX_FIELD_INDEX);
        let entity = || metadata.name.clone();

        let mut fields = Vec::with_capacity(metadata.fields.len());
        let mut positions = Vec::with_capacity(metadata.fields.len());
        for field in &metadata.fields {
            let index = u32::try_from(field.index)
                .ok()
                .filter(|index| *index <= max)
                .ok_or_else(|| SchemaError::InvalidIndex {
                    entity: entity(),
                    index: field.index,
                    max,
                })?;

            let (kind, optional) = match &field.kind {
                ValueKind::Optional(inner) => ((**inner).clone(), true),
                other => (other.clone(), field.optional),
            };
            if matches!(kind, ValueKind::Optional(_)) {
                return Err(SchemaError::NestedOptional {
                    entity: entity(),
                    index,
                });
            }

            positions.push(index);
            fields.push(FieldDescriptor {
                index,
                name: field.name.clone(),
                kind,
                optional,
                default_present: field.default_present,
            });
        }

        fields.sort_by_key(|field| field.index);
        if let Some(pair) = fields.windows(2).find(|pair| pair[0].index == pair[1].index) {
            return Err(SchemaError::DuplicateIndex {
                entity: entity(),
                index: pair[0].index,
            });
        }

        let by_index = fields
            .iter()
            .enumerate()
            .map(|(slot, field)| (field.index, slot))
            .collect();
        let fingerprint = layout_fingerprint(&metadata.name, &fields);

        Ok(Self {
            name: metadata.name.clone(),
            fields,
            by_index,
            positions,
            fingerprint,
        })
    }

    /// Entity type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a field by wire index.
    pub fn field_by_index(&self, index: u32) -> Option<&FieldDescriptor> {
        self.by_index.get(&index).and_then(|slot| self.fields.get(*slot))
    }

    /// All fields in ascending index order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Fields that must be present in every stream.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.is_required())
    }

    /// Wire index of the field declared at `position`.
    pub fn index_at(&self, position: usize) -> Option<u32> {
        self.positions.get(position).copied()
    }

    /// Declaration position of the field with `index`.
    pub fn position_of(&self, index: u32) -> Option<usize> {
        self.positions.iter().position(|candidate| *candidate == index)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the entity has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Deterministic 64-bit hash of the canonical layout.
    ///
    /// Equal fingerprints mean equal name, indices, field names, kinds and flags.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

fn layout_fingerprint(name: &str, fields: &[FieldDescriptor]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(name.as_bytes());
    hasher.write_u8(0xff);
    for field in fields {
        hasher.write(&field.index.to_le_bytes());
        hasher.write(field.name.as_bytes());
        hasher.write_u8(0xff);
        hasher.write(field.kind.to_string().as_bytes());
        hasher.write_u8(0xff);
        hasher.write_u8(u8::from(field.optional) | (u8::from(field.default_present) << 1));
    }
    hasher.finish()
}
