//! Tools for inspecting the physical structure of encoded streams.
//! Useful for debugging schema evolution and verifying wire layouts.

use crate::codec;
use crate::error::DecodeError;
use crate::format::{PRESENT, WireShape};
use crate::io::WireSource;
use crate::schema::{SchemaDescriptor, SchemaRegistry, ValueKind};
use serde::Serialize;
use std::fmt;

/// A structural report of one encoded entity.
#[derive(Debug, Clone, Serialize)]
pub struct DebugReport {
    /// Entity type the stream was read as.
    pub entity: String,
    /// Layout fingerprint of that entity's schema.
    pub fingerprint: u64,
    /// Absolute offset of the entity stream in the inspected buffer.
    pub offset: usize,
    /// Length of the entity stream.
    pub total_bytes: usize,
    /// Every field span, in stream order.
    pub fields: Vec<FieldSpan>,
    /// Required fields that never appeared.
    pub missing_required: Vec<u32>,
}

/// One `(tag, payload)` span.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpan {
    /// Wire index from the tag.
    pub index: u32,
    /// Field name, if the schema knows the index.
    pub name: Option<String>,
    /// Shape from the tag.
    pub shape: WireShape,
    /// Absolute offset of the tag.
    pub offset: usize,
    /// Tag plus payload length.
    pub length: usize,
    /// For optional shapes, whether the presence byte was set.
    pub present: Option<bool>,
    /// Report for a nested entity payload.
    pub nested: Option<Box<DebugReport>>,
}

impl FieldSpan {
    /// Whether the schema declares this index.
    pub fn known(&self) -> bool {
        self.name.is_some()
    }
}

/// The Tagcode Inspector tool.
#[derive(Debug, Clone, Copy)]
pub struct WireInspector<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> WireInspector<'r> {
    /// An inspector resolving nested entities through `registry`.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Walks `bytes` as an entity of `schema` without building values.
    ///
    /// Fails only when the stream cannot be delimited: truncation, malformed
    /// varints, or nesting past the depth limit. Missing required fields are
    /// reported, not raised.
    pub fn inspect(&self, bytes: &[u8], schema: &SchemaDescriptor) -> Result<DebugReport, DecodeError> {
        self.inspect_entity(bytes, 0, schema, 0)
    }

    fn inspect_entity(
        &self,
        bytes: &[u8],
        base: usize,
        schema: &SchemaDescriptor,
        depth: usize,
    ) -> Result<DebugReport, DecodeError> {
        let limit = self.registry.config().max_depth;
        if depth >= limit {
            return Err(DecodeError::DepthExceeded { limit });
        }

        let mut source = WireSource::new(bytes);
        let mut fields = Vec::new();
        while !source.is_empty() {
            let start = source.position();
            let tag = source.read_tag()?;
            let payload_start = source.position();
            codec::skip_field(tag.shape, &mut source)?;
            let payload = &bytes[payload_start..source.position()];

            let descriptor = schema.field_by_index(tag.index);
            let present = tag.shape.is_optional().then(|| payload.first() == Some(&PRESENT));
            let nested = match (descriptor.map(|field| field.kind()), present) {
                (Some(ValueKind::Entity(target)), None | Some(true))
                    if descriptor.is_some_and(|field| field.shape() == tag.shape) =>
                {
                    let offset = usize::from(present.is_some());
                    let mut span = WireSource::new(&payload[offset..]);
                    let inner = span.read_len_prefixed()?;
                    let inner_base = base + payload_start + offset + (payload.len() - offset - inner.len());
                    let target = self.registry.resolve(target)?;
                    Some(Box::new(self.inspect_entity(inner, inner_base, target, depth + 1)?))
                }
                _ => None,
            };

            fields.push(FieldSpan {
                index: tag.index,
                name: descriptor.map(|field| field.name().to_owned()),
                shape: tag.shape,
                offset: base + start,
                length: source.position() - start,
                present,
                nested,
            });
        }

        let missing_required = schema
            .required_fields()
            .map(|field| field.index())
            .filter(|index| fields.iter().all(|span| span.index != *index))
            .collect();

        Ok(DebugReport {
            entity: schema.name().to_owned(),
            fingerprint: schema.fingerprint(),
            offset: base,
            total_bytes: bytes.len(),
            fields,
            missing_required,
        })
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== TAGCODE INSPECTOR REPORT ===")?;
        writeln!(f, "Entity:      {} ({:#018x})", self.entity, self.fingerprint)?;
        writeln!(f, "Stream Size: {}b", self.total_bytes)?;
        if !self.missing_required.is_empty() {
            writeln!(f, "Missing:     {:?}", self.missing_required)?;
        }
        writeln!(f, "\n[FIELD LAYOUT]")?;
        self.fmt_fields(f, "")
    }
}

impl DebugReport {
    fn fmt_fields(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        for (i, span) in self.fields.iter().enumerate() {
            let is_last = i + 1 == self.fields.len();
            let connector = if is_last { "└── " } else { "├── " };
            let child_prefix = if is_last { "    " } else { "│   " };
            let presence = match span.present {
                Some(true) => " present",
                Some(false) => " absent",
                None => "",
            };
            writeln!(
                f,
                "{}{}#{} {} [{}] @{} {}b{}",
                prefix,
                connector,
                span.index,
                span.name.as_deref().unwrap_or("<unknown>"),
                span.shape,
                span.offset,
                span.length,
                presence
            )?;
            if let Some(nested) = &span.nested {
                nested.fmt_fields(f, &format!("{prefix}{child_prefix}"))?;
            }
        }
        Ok(())
    }
}
