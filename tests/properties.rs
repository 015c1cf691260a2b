#![allow(missing_docs)]

use proptest::prelude::*;
use tagcode::{
    DecodeError, EntityInstance, EntityMetadata, FieldMetadata, Tagcode, TagcodeError, Value,
    ValueKind,
};

// --- SCHEMA UNDER TEST ---

fn codec() -> Tagcode {
    let mut codec = Tagcode::new();
    codec
        .register_all([
            EntityMetadata::new("Reading")
                .field(0, "sensor", ValueKind::u16())
                .field(1, "value", ValueKind::f64()),
            EntityMetadata::new("Record")
                .field(0, "id", ValueKind::i64())
                .optional_field(2, "label", ValueKind::String)
                .field(3, "flags", ValueKind::sequence(ValueKind::Bool))
                .field(5, "blob", ValueKind::Bytes)
                .optional_field(6, "small", ValueKind::i8())
                .field(9, "readings", ValueKind::sequence(ValueKind::entity("Reading")))
                .optional_field(12, "ratio", ValueKind::f32())
                .with_field(FieldMetadata::new(14, "retries", ValueKind::u32()).with_default()),
        ])
        .expect("schemas");
    codec
}

/// `None` leaves the field off the instance; otherwise an explicit present or absent value.
fn optional<T: Into<Value> + std::fmt::Debug>(
    inner: impl Strategy<Value = T>,
) -> impl Strategy<Value = Option<Value>> {
    proptest::option::of(proptest::option::of(inner)).prop_map(|slot| {
        slot.map(|value| match value {
            Some(value) => Value::present(value),
            None => Value::absent(),
        })
    })
}

fn with_slot(instance: EntityInstance, index: u32, slot: Option<Value>) -> EntityInstance {
    match slot {
        Some(value) => instance.with(index, value),
        None => instance,
    }
}

fn reading() -> impl Strategy<Value = Value> {
    (any::<u16>(), any::<f64>().prop_filter("finite", |v| v.is_finite())).prop_map(|(sensor, value)| {
        Value::Entity(EntityInstance::new("Reading").with(0, sensor).with(1, value))
    })
}

prop_compose! {
    fn record()(
        id in any::<i64>(),
        label in optional(".{0,24}"),
        flags in proptest::collection::vec(any::<bool>(), 0..16),
        blob in proptest::collection::vec(any::<u8>(), 0..64),
        small in optional(any::<i8>()),
        readings in proptest::collection::vec(reading(), 0..4),
        ratio in optional(any::<f32>().prop_filter("finite", |v| v.is_finite())),
        retries in any::<u32>(),
    ) -> EntityInstance {
        let record = EntityInstance::new("Record")
            .with(0, id)
            .with(3, flags.into_iter().map(Value::Bool).collect::<Vec<_>>())
            .with(5, Value::Bytes(blob))
            .with(9, readings)
            .with(14, retries);
        let record = with_slot(record, 2, label);
        let record = with_slot(record, 6, small);
        with_slot(record, 12, ratio)
    }
}

proptest! {
    #[test]
    fn round_trip(instance in record()) {
        let codec = codec();
        let schema = codec.schema("Record").expect("schema");
        let bytes = codec.encode(&instance, schema).expect("encode");
        prop_assert_eq!(codec.decode(&bytes, schema).expect("decode"), instance);
    }

    #[test]
    fn truncation_never_yields_a_value(instance in record(), cut in any::<prop::sample::Index>()) {
        let codec = codec();
        let schema = codec.schema("Record").expect("schema");
        let bytes = codec.encode(&instance, schema).expect("encode");
        let cut = cut.index(bytes.len());
        match codec.decode(&bytes[..cut], schema) {
            Err(TagcodeError::Decode(
                DecodeError::UnexpectedEof { .. }
                | DecodeError::MalformedVarint
                | DecodeError::MissingRequiredField(_),
            )) => {}
            // Only possible once every required field is in; what was read must be exact,
            // and fields cut off read as absent or defaulted.
            Ok(decoded) => {
                for (index, value) in decoded.fields() {
                    prop_assert!(
                        instance.get(*index) == Some(value)
                            || *value == Value::absent()
                            || (*index == 14 && *value == Value::UInt(0)),
                        "field {} decoded as {:?}", index, value
                    );
                }
            }
            other => prop_assert!(false, "prefix of {} bytes gave {:?}", cut, other),
        }
    }

    #[test]
    fn garbage_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let codec = codec();
        let schema = codec.schema("Record").expect("schema");
        let _ = codec.decode(&bytes, schema);
        let _ = codec.inspect(&bytes, schema);
    }
}
