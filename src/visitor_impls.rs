//! `WireValue` for standard Rust types.

use crate::error::DecodeError;
use crate::rt;
use crate::schema::{MetadataSet, ValueKind};
use crate::value::{ByteBuf, Value};
use crate::visitor::WireValue;

// --- INTEGERS ---

macro_rules! impl_integer {
    ($($ty:ty => $ctor:ident),* $(,)?) => {
        $(
            impl WireValue for $ty {
                fn kind() -> ValueKind {
                    ValueKind::$ctor()
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    let number = value
                        .as_integer()
                        .ok_or_else(|| rt::mismatch(stringify!($ty), &value))?;
                    <$ty>::try_from(number).map_err(|_| DecodeError::IntegerOverflow {
                        width: <$ty>::BITS as u8,
                        signed: <$ty>::MIN != 0,
                    })
                }
            }
        )*
    };
}

impl_integer! {
    i8 => i8, i16 => i16, i32 => i32, i64 => i64,
    u8 => u8, u16 => u16, u32 => u32, u64 => u64,
}

// --- SCALARS ---

macro_rules! impl_scalar {
    ($($ty:ty => $kind:expr, $variant:ident;)*) => {
        $(
            impl WireValue for $ty {
                fn kind() -> ValueKind {
                    $kind
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(rt::mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

impl_scalar! {
    f32 => ValueKind::f32(), F32;
    f64 => ValueKind::f64(), F64;
    bool => ValueKind::Bool, Bool;
    String => ValueKind::String, String;
}

impl WireValue for ByteBuf {
    fn kind() -> ValueKind {
        ValueKind::Bytes
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.0.clone())
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bytes(bytes) => Ok(Self(bytes)),
            other => Err(rt::mismatch("ByteBuf", &other)),
        }
    }
}

// --- WRAPPERS ---

impl<T: WireValue> WireValue for Option<T> {
    fn kind() -> ValueKind {
        ValueKind::optional(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::Optional(self.as_ref().map(|inner| Box::new(inner.to_value())))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Optional(None) => Ok(None),
            Value::Optional(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(rt::mismatch("Option", &other)),
        }
    }

    fn missing() -> Option<Self> {
        Some(None)
    }

    fn collect_metadata(set: &mut MetadataSet) {
        T::collect_metadata(set);
    }
}

impl<T: WireValue> WireValue for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::sequence(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(WireValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(rt::mismatch("Vec", &other)),
        }
    }

    fn collect_metadata(set: &mut MetadataSet) {
        T::collect_metadata(set);
    }
}

impl<T: WireValue> WireValue for Box<T> {
    fn kind() -> ValueKind {
        T::kind()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        T::from_value(value).map(Box::new)
    }

    fn missing() -> Option<Self> {
        T::missing().map(Box::new)
    }

    fn collect_metadata(set: &mut MetadataSet) {
        T::collect_metadata(set);
    }
}
