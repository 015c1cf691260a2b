//! Centralized error handling for Tagcode.
//!
//! Failures are split by the phase that produces them:
//!
//! - **Schema errors** ([`SchemaError`]): registration-time problems with entity
//!   metadata. Fatal to that registration only.
//! - **Encode errors** ([`EncodeError`]): the instance handed to the encoder does
//!   not fit its schema. These are caller bugs; no partial output is returned.
//! - **Decode errors** ([`DecodeError`]): the byte stream is truncated, malformed
//!   or incompatible with the schema. Always recoverable by the caller; no partial
//!   instance is exposed.
//!
//! [`TagcodeError`] wraps all three so the facade can use a single [`Result`].
//! Every error type is `Clone` so results can be fanned out of parallel batches.
//!
//! ## Usage
//!
//! ```rust
//! use tagcode::{DecodeError, EntityMetadata, Tagcode, TagcodeError, ValueKind};
//!
//! let mut codec = Tagcode::new();
//! let schema = codec.register_schema(
//!     EntityMetadata::new("Ping").field(0, "seq", ValueKind::u32()),
//! )?;
//!
//! match codec.decode(&[0x00], &schema) {
//!     Err(TagcodeError::Decode(DecodeError::UnexpectedEof { .. })) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # Ok::<(), TagcodeError>(())
//! ```

use crate::format::WireShape;
use thiserror::Error;

/// A specialized `Result` type for Tagcode facade operations.
pub type Result<T> = std::result::Result<T, TagcodeError>;

/// Registration-time failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields of the same entity share a wire index.
    #[error("entity `{entity}` declares wire index {index} more than once")]
    DuplicateIndex {
        /// Entity type name.
        entity: String,
        /// The repeated index.
        index: u32,
    },

    /// An index is negative or above the configured maximum.
    #[error("entity `{entity}` declares invalid wire index {index} (allowed 0..={max})")]
    InvalidIndex {
        /// Entity type name.
        entity: String,
        /// The offending index as declared.
        index: i64,
        /// The configured maximum.
        max: u32,
    },

    /// An entity reference names a type that cannot be resolved.
    #[error("entity `{entity}` references unregistered entity `{target}`")]
    UnresolvedReference {
        /// Entity type name.
        entity: String,
        /// The unresolved target name.
        target: String,
    },

    /// The same entity name was registered with a different layout.
    #[error("entity `{entity}` is already registered with a different layout")]
    ConflictingDefinition {
        /// Entity type name.
        entity: String,
    },

    /// `optional-of(optional-of(_))` has no distinct wire representation.
    #[error("field {index} of entity `{entity}` nests an optional inside an optional")]
    NestedOptional {
        /// Entity type name.
        entity: String,
        /// The offending field.
        index: u32,
    },

    /// Lookup of an entity name that was never registered.
    #[error("no entity named `{0}` is registered")]
    UnknownEntity(String),
}

/// Failures while encoding an instance. These indicate a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A value does not match the kind declared for its field.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// `Entity#index` path of the offending value.
        path: String,
        /// The declared kind.
        expected: String,
        /// What the instance actually held.
        found: String,
    },

    /// A non-optional field has no value on the instance.
    #[error("entity `{entity}` is missing required field {index}")]
    MissingRequiredField {
        /// Entity type name.
        entity: String,
        /// The missing field's wire index.
        index: u32,
    },

    /// The instance carries a value for an index the schema does not declare.
    #[error("entity `{entity}` has no field with index {index}")]
    UnknownField {
        /// Entity type name.
        entity: String,
        /// The undeclared index.
        index: u32,
    },

    /// Nested entities exceed the configured recursion limit.
    #[error("entity nesting exceeds the depth limit of {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// A referenced schema could not be resolved.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failures while decoding a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ended before a tag, value or length-prefixed span was complete.
    #[error("unexpected end of input: needed {needed} byte(s), {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the current read required.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A varint did not terminate within 10 bytes or overflowed 64 bits.
    #[error("malformed varint")]
    MalformedVarint,

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// A non-optional field never appeared in the stream.
    #[error("missing required field {0}")]
    MissingRequiredField(u32),

    /// An element count cannot fit in the remaining input, or exceeds the limit.
    #[error("declared length {declared} exceeds the buffer ({remaining} byte(s) remaining)")]
    LengthExceedsBuffer {
        /// The declared count.
        declared: u64,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A known field arrived with a different wire shape than its schema implies.
    #[error("field {index} has wire shape {found}, schema expects {expected}")]
    WireShapeMismatch {
        /// The field's wire index.
        index: u32,
        /// Shape derived from the schema.
        expected: WireShape,
        /// Shape found in the tag.
        found: WireShape,
    },

    /// The same index appeared twice in one entity.
    #[error("field {0} appears more than once")]
    DuplicateField(u32),

    /// A length-delimited span held bytes past its last element.
    #[error("{0} unread byte(s) left in a length-delimited span")]
    TrailingBytes(usize),

    /// A boolean payload byte other than 0 or 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A presence byte other than 0 or 1.
    #[error("invalid presence byte {0:#04x}")]
    InvalidPresence(u8),

    /// A decoded integer does not fit the declared width.
    #[error("integer does not fit in {}{width}", if *signed { "i" } else { "u" })]
    IntegerOverflow {
        /// Declared width in bits.
        width: u8,
        /// Whether the declared kind is signed.
        signed: bool,
    },

    /// Nested entities exceed the configured recursion limit.
    #[error("entity nesting exceeds the depth limit of {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// A decoded value could not be converted into the requested Rust type.
    #[error("cannot convert {found} into {expected}")]
    TypeMismatch {
        /// The Rust-side expectation.
        expected: String,
        /// What the decoded value was.
        found: String,
    },

    /// A referenced schema could not be resolved.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DecodeError {
    pub(crate) fn eof(needed: usize, remaining: usize) -> Self {
        Self::UnexpectedEof { needed, remaining }
    }
}

/// The master error covering every failure domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagcodeError {
    /// Registration failure.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    /// Encoding failure.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Decoding failure.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
