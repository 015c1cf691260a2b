//! Traits that map typed Rust values onto the dynamic [`Value`] model.
//!
//! [`WireValue`] covers anything that can sit in a field: primitives,
//! `String`, [`ByteBuf`](crate::ByteBuf), `Option<T>`, `Vec<T>`, `Box<T>` and
//! entities. [`WireEntity`] adds what a top-level entity needs: its name, its
//! metadata, and conversion to and from an [`EntityInstance`].
//!
//! Both are normally implemented by `#[derive(WireEntity)]`.

use crate::error::DecodeError;
use crate::schema::{EntityMetadata, MetadataSet, ValueKind};
use crate::value::{EntityInstance, Value};

/// A type that can be the value of a field.
pub trait WireValue: Sized {
    /// The declared kind of a field holding this type.
    fn kind() -> ValueKind;

    /// Converts to the dynamic model.
    fn to_value(&self) -> Value;

    /// Converts back from a decoded value.
    fn from_value(value: Value) -> Result<Self, DecodeError>;

    /// The value to use when the field is missing from an instance, if any.
    ///
    /// Only `Option<T>` has one.
    fn missing() -> Option<Self> {
        None
    }

    /// Adds metadata for every entity type reachable from this type.
    ///
    /// Non-entity types only forward to their element types.
    fn collect_metadata(_set: &mut MetadataSet) {}
}

/// A Rust type that maps to a registered entity.
///
/// # Example
///
/// ```rust
/// use tagcode::{Tagcode, WireEntity};
///
/// #[derive(Debug, PartialEq, WireEntity)]
/// struct Person {
///     #[wire(index = 0)]
///     id: i32,
///     #[wire(index = 2)]
///     name: Option<String>,
/// }
///
/// let mut codec = Tagcode::new();
/// codec.register::<Person>()?;
///
/// let alice = Person { id: 7, name: Some("hi".into()) };
/// let bytes = codec.to_bytes(&alice)?;
/// assert_eq!(bytes, [0x00, 0x07, 0x14, 0x01, 0x02, b'h', b'i']);
/// assert_eq!(codec.from_bytes::<Person>(&bytes)?, alice);
/// # Ok::<(), tagcode::TagcodeError>(())
/// ```
pub trait WireEntity: WireValue {
    /// The registered entity name.
    fn entity_name() -> &'static str;

    /// This type's field layout.
    fn metadata() -> EntityMetadata;

    /// Converts to a dynamic instance.
    fn to_instance(&self) -> EntityInstance;

    /// Converts from a decoded instance.
    fn from_instance(instance: EntityInstance) -> Result<Self, DecodeError>;
}
