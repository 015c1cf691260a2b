//! # Tagcode
//!
//! A schema-driven, index-tagged binary codec for structured entities.
//!
//! ## Overview
//!
//! Every field of an entity carries an explicit, stable **wire index**. Tagcode
//! serializes an entity into a dense byte stream addressed by those indices and
//! reconstructs it again, tolerating optional, nested and collection-valued
//! fields. Because each field is tagged with its index rather than its position,
//! schemas can evolve: new indices can be added, and decoders built against an
//! older schema skip fields they do not know.
//!
//! ### Key Features
//!
//! *   **Compact:** LEB128 varints for tags, integers and lengths. Small indices
//!     and small values cost one byte each.
//! *   **Forward Compatible:** Unknown indices are skipped byte-exact.
//! *   **Explicit Absence:** An absent optional is still tagged, with a presence
//!     byte of zero.
//! *   **Bounded:** Every length is checked against the remaining input before
//!     allocation, and nesting depth is capped.
//! *   **Shareable:** Schemas are immutable once registered; a [`Tagcode`] can
//!     serve many threads at once, and batch calls fan out over Rayon.
//!
//! ## Wire Format
//!
//! ```text
//! [Tag] [Payload] [Tag] [Payload] ...
//! tag = varint((index << 3) | shape)
//! ```
//!
//! See [`format`] for the shape table. There is no header, length or checksum;
//! message framing belongs to the transport.
//!
//! ## Core Concepts
//!
//! ### Schemas
//!
//! An [`EntityMetadata`] lists `(index, name, kind, optional)` tuples. The
//! [`SchemaRegistry`] validates it once (unique, in-range indices; resolvable
//! entity references) and returns an immutable [`SchemaDescriptor`].
//!
//! ### Values
//!
//! The encoder and decoder work on [`EntityInstance`], a dynamic map from wire
//! index to [`Value`]. Typed structs reach it through [`WireEntity`], usually
//! derived.
//!
//! ## Usage Patterns
//!
//! ### Dynamic Schemas
//!
//! ```rust
//! use tagcode::{EntityInstance, EntityMetadata, Tagcode, Value, ValueKind};
//!
//! let mut codec = Tagcode::new();
//! let schema = codec.register_schema(
//!     EntityMetadata::new("Person")
//!         .field(0, "id", ValueKind::i32())
//!         .optional_field(2, "name", ValueKind::String),
//! )?;
//!
//! let person = EntityInstance::new("Person").with(0, 7i32);
//! let bytes = codec.encode(&person, &schema)?;
//! assert_eq!(bytes, [0x00, 0x07, 0x14, 0x00]);
//!
//! let decoded = codec.decode(&bytes, &schema)?;
//! assert_eq!(decoded.get(2), Some(&Value::absent()));
//! # Ok::<(), tagcode::TagcodeError>(())
//! ```
//!
//! ### Derived Entities
//!
//! ```rust
//! use tagcode::{Tagcode, WireEntity};
//!
//! #[derive(Debug, PartialEq, WireEntity)]
//! struct Node {
//!     #[wire(index = 0)]
//!     value: u32,
//!     #[wire(index = 1)]
//!     next: Option<Box<Node>>,
//! }
//!
//! let mut codec = Tagcode::new();
//! codec.register::<Node>()?;
//!
//! let list = Node { value: 1, next: Some(Box::new(Node { value: 2, next: None })) };
//! let bytes = codec.to_bytes(&list)?;
//! assert_eq!(codec.from_bytes::<Node>(&bytes)?, list);
//! # Ok::<(), tagcode::TagcodeError>(())
//! ```
//!
//! ### Safety and Error Handling
//!
//! * **No Unsafe:** The crate forbids `unsafe` code.
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** All failures correspond to a [`TagcodeError`] type.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

extern crate self as tagcode;

// --- PUBLIC API MODULES ---
pub mod api;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod inspector;
pub mod schema;
pub mod value;
pub mod varint;
pub mod visitor;

// --- INTERNAL IMPLEMENTATION MODULES (Hidden from Docs) ---
#[doc(hidden)]
pub mod io;

// Private modules
mod visitor_impls;

// --- MACRO SUPPORT MODULES ---

/// Runtime utilities used by the derived code.
#[doc(hidden)]
pub mod rt;

// --- RE-EXPORTS ---

pub use api::{Tagcode, TagcodeOptions};
pub use config::CodecConfig;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{DecodeError, EncodeError, Result, SchemaError, TagcodeError};
pub use format::WireShape;
pub use inspector::{DebugReport, FieldSpan, WireInspector};
pub use schema::{
    EntityMetadata, FieldDescriptor, FieldMetadata, FloatWidth, IntWidth, MetadataSet,
    SchemaDescriptor, SchemaRegistry, ValueKind,
};
pub use value::{ByteBuf, EntityInstance, Value};
pub use visitor::{WireEntity, WireValue};

// Re-export the derive macro so it is accessible as `tagcode::WireEntity`
#[cfg(feature = "derive")]
pub use tagcode_derive::WireEntity;
