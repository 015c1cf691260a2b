use super::kind::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One `(index, name, kind, optional)` tuple as reported by metadata discovery.
///
/// The index is signed because discovery sources (annotations, config files)
/// can carry negative values; registration rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Declared wire index.
    pub index: i64,
    /// Field name, used for diagnostics only.
    pub name: String,
    /// Value kind.
    pub kind: ValueKind,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Whether a field missing from the stream decodes to its kind's default.
    #[serde(default)]
    pub default_present: bool,
}

impl FieldMetadata {
    /// A required field.
    pub fn new(index: i64, name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
            optional: false,
            default_present: false,
        }
    }

    /// Marks the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field as defaulted when missing from the stream.
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.default_present = true;
        self
    }
}

/// Everything metadata discovery reports about one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity type name; the key under which it is registered.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldMetadata>,
}

impl EntityMetadata {
    /// Metadata with no fields yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a required field.
    #[must_use]
    pub fn field(self, index: i64, name: impl Into<String>, kind: ValueKind) -> Self {
        self.with_field(FieldMetadata::new(index, name, kind))
    }

    /// Adds an optional field.
    #[must_use]
    pub fn optional_field(self, index: i64, name: impl Into<String>, kind: ValueKind) -> Self {
        self.with_field(FieldMetadata::new(index, name, kind).optional())
    }

    /// Adds a fully specified field.
    #[must_use]
    pub fn with_field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    /// Entity names referenced by any field, including through sequences and optionals.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for field in &self.fields {
            field.kind.for_each_reference(&mut |name| names.push(name));
        }
        names
    }
}

/// Accumulates metadata for a type and everything it references, once per name.
///
/// Used by derived [`WireValue::collect_metadata`](crate::visitor::WireValue::collect_metadata)
/// implementations; the name is marked before recursing so self-referential
/// types terminate.
#[derive(Debug, Default)]
pub struct MetadataSet {
    seen: HashSet<String>,
    entries: Vec<EntityMetadata>,
}

impl MetadataSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as visited. Returns false if it already was.
    pub fn begin(&mut self, name: &str) -> bool {
        self.seen.insert(name.to_owned())
    }

    /// Records metadata for a type previously passed to [`begin`](Self::begin).
    pub fn push(&mut self, metadata: EntityMetadata) {
        self.entries.push(metadata);
    }

    /// Number of collected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The collected metadata, outermost type first.
    pub fn into_vec(self) -> Vec<EntityMetadata> {
        self.entries
    }
}
