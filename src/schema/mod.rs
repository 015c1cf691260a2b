//! Entity schemas: what a field is, how an entity is laid out, and where
//! registered layouts live.
//!
//! Metadata discovery produces [`EntityMetadata`]; the [`SchemaRegistry`]
//! validates it once and hands back an immutable [`SchemaDescriptor`] that the
//! encoder and decoder consult for every field.

/// Defines `ValueKind` and integer/float widths.
pub mod kind;
/// Defines the unvalidated `EntityMetadata` input.
pub mod metadata;
/// Defines the validated `SchemaDescriptor`.
pub mod descriptor;
/// Defines the `SchemaRegistry`.
pub mod registry;

pub use descriptor::{FieldDescriptor, SchemaDescriptor};
pub use kind::{FloatWidth, IntWidth, ValueKind};
pub use metadata::{EntityMetadata, FieldMetadata, MetadataSet};
pub use registry::SchemaRegistry;
