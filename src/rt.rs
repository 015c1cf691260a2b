//! Runtime utilities for generated code (Macros).
//! Do not use directly.

use crate::error::DecodeError;
use crate::value::{EntityInstance, Value};
use crate::visitor::{WireEntity, WireValue};

/// Conversion failure from `found` into the Rust type `expected`.
pub fn mismatch(expected: &str, found: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        expected: expected.to_owned(),
        found: found.type_name().to_owned(),
    }
}

/// Fails unless `instance` is an entity of type `name`.
pub fn check_entity(instance: &EntityInstance, name: &str) -> Result<(), DecodeError> {
    if instance.entity() == name {
        Ok(())
    } else {
        Err(DecodeError::TypeMismatch {
            expected: name.to_owned(),
            found: instance.entity().to_owned(),
        })
    }
}

/// Moves field `index` out of `instance` and converts it.
///
/// A missing field is only acceptable for types with a [`WireValue::missing`] value.
pub fn take_field<T: WireValue>(instance: &mut EntityInstance, index: u32) -> Result<T, DecodeError> {
    match instance.take(index) {
        Some(value) => T::from_value(value),
        None => T::missing().ok_or(DecodeError::MissingRequiredField(index)),
    }
}

/// Like [`take_field`], falling back to `T::default()` when the field is missing.
pub fn take_field_or_default<T: WireValue + Default>(
    instance: &mut EntityInstance,
    index: u32,
) -> Result<T, DecodeError> {
    match instance.take(index) {
        Some(value) => T::from_value(value),
        None => Ok(T::default()),
    }
}

/// `WireValue::from_value` for entity types.
pub fn entity_from_value<T: WireEntity>(value: Value) -> Result<T, DecodeError> {
    match value {
        Value::Entity(instance) => T::from_instance(instance),
        other => Err(mismatch(T::entity_name(), &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_depend_on_type() {
        let mut instance = EntityInstance::new("E").with(0, 5u32);
        assert_eq!(take_field::<u32>(&mut instance, 0), Ok(5));
        assert_eq!(take_field::<Option<u32>>(&mut instance, 0), Ok(None));
        assert_eq!(
            take_field::<u32>(&mut instance, 0),
            Err(DecodeError::MissingRequiredField(0))
        );
        assert_eq!(take_field_or_default::<String>(&mut instance, 3), Ok(String::new()));
    }

    #[test]
    fn entity_names_are_checked() {
        let instance = EntityInstance::new("A");
        assert!(check_entity(&instance, "A").is_ok());
        assert!(matches!(
            check_entity(&instance, "B"),
            Err(DecodeError::TypeMismatch { ref expected, .. }) if expected == "B"
        ));
    }
}
