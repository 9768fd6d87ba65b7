//! Dynamic bind values and the conversions in and out of them.

use crate::error::ConvertError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A single bind argument or column value.
///
/// `Bytes` is scalar binary data and is never expanded by
/// [`expand_in`](crate::expand_in); `List` is an ordered sequence and is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "json",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The elements of a `List`, or `None` for every scalar (including `Bytes`).
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Natural value of a JSON document: scalars map to their own variants,
    /// arrays and objects stay `Json`.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Json(other.clone()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        }
    )*};
}

value_from!(
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    Uuid => Uuid,
    Vec<Value> => List,
);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Json(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Produces the bind representation of a value.
///
/// This is the hook that lets a type decide what it looks like to the
/// backend, e.g. [`BitBool`](crate::types::BitBool) binds as a single byte.
pub trait ToValue {
    fn to_value(&self) -> Result<Value, ConvertError>;
}

/// Builds a Rust value out of a column value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConvertError>;
}

/// Object-safe assignment used as the write target when filling records.
pub trait Assign {
    fn assign(&mut self, value: Value) -> Result<(), ConvertError>;
}

impl<T: FromValue> Assign for T {
    fn assign(&mut self, value: Value) -> Result<(), ConvertError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value, ConvertError> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value, ConvertError> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            other => Err(ConvertError::incompatible(other.kind(), "bool")),
        }
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Result<Value, ConvertError> {
                Ok(Value::Int(i64::from(*self)))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, ConvertError> {
                match value {
                    Value::Int(v) => <$ty>::try_from(v).map_err(|_| {
                        ConvertError::new(format!(
                            "integer {v} out of range for {}",
                            stringify!($ty)
                        ))
                    }),
                    Value::Text(s) => s.trim().parse::<$ty>().map_err(|e| {
                        ConvertError::new(format!("parse {s:?} as {}: {e}", stringify!($ty)))
                    }),
                    other => Err(ConvertError::incompatible(other.kind(), stringify!($ty))),
                }
            }
        }
    )*};
}

int_value!(i8, i16, i32, i64, u16, u32);

impl ToValue for u64 {
    fn to_value(&self) -> Result<Value, ConvertError> {
        i64::try_from(*self)
            .map(Value::Int)
            .map_err(|_| ConvertError::new(format!("u64 {self} overflows i64")))
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Int(v) => u64::try_from(v)
                .map_err(|_| ConvertError::new(format!("integer {v} out of range for u64"))),
            other => Err(ConvertError::incompatible(other.kind(), "u64")),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Float(f64::from(*self)))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Float(v) => Ok(v as f32),
            Value::Int(v) => Ok(v as f32),
            other => Err(ConvertError::incompatible(other.kind(), "f32")),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Float(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(ConvertError::incompatible(other.kind(), "f64")),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Text(self.to_owned()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Text(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bytes(b) => String::from_utf8(b)
                .map_err(|e| ConvertError::new(format!("invalid utf-8 in text column: {e}"))),
            Value::Json(v) => Ok(v.to_string()),
            Value::Uuid(u) => Ok(u.to_string()),
            other => Err(ConvertError::incompatible(other.kind(), "String")),
        }
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Bytes(self.to_vec()))
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Bytes(self.clone()))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(ConvertError::incompatible(other.kind(), "Vec<u8>")),
        }
    }
}

impl ToValue for bytes::Bytes {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Bytes(self.to_vec()))
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Json(self.clone()))
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Null => Ok(serde_json::Value::Null),
            Value::Text(s) => serde_json::from_str(&s)
                .map_err(|e| ConvertError::new(format!("invalid json: {e}"))),
            Value::Bytes(b) => serde_json::from_slice(&b)
                .map_err(|e| ConvertError::new(format!("invalid json: {e}"))),
            other => Err(ConvertError::incompatible(other.kind(), "json")),
        }
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Timestamp(*self))
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::TimestampTz(v) => Ok(v.naive_utc()),
            other => Err(ConvertError::incompatible(other.kind(), "NaiveDateTime")),
        }
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::TimestampTz(*self))
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::TimestampTz(v) => Ok(v),
            Value::Timestamp(v) => Ok(v.and_utc()),
            other => Err(ConvertError::incompatible(other.kind(), "DateTime<Utc>")),
        }
    }
}

impl ToValue for Uuid {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Uuid(*self))
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Text(s) => {
                Uuid::parse_str(&s).map_err(|e| ConvertError::new(format!("invalid uuid: {e}")))
            }
            other => Err(ConvertError::incompatible(other.kind(), "Uuid")),
        }
    }
}

// Sequences bind as `Value::List` so `IN (?)` can be expanded. `Vec<u8>` is
// deliberately absent: byte strings are scalar.
macro_rules! list_value {
    ($($ty:ty),*) => {$(
        impl ToValue for Vec<$ty> {
            fn to_value(&self) -> Result<Value, ConvertError> {
                self.as_slice().to_value()
            }
        }

        impl ToValue for [$ty] {
            fn to_value(&self) -> Result<Value, ConvertError> {
                self.iter()
                    .map(ToValue::to_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
        }

        impl<const N: usize> ToValue for [$ty; N] {
            fn to_value(&self) -> Result<Value, ConvertError> {
                self.as_slice().to_value()
            }
        }

        impl FromValue for Vec<$ty> {
            fn from_value(value: Value) -> Result<Self, ConvertError> {
                match value {
                    Value::List(items) => items.into_iter().map(<$ty>::from_value).collect(),
                    other => Err(ConvertError::incompatible(
                        other.kind(),
                        concat!("Vec<", stringify!($ty), ">"),
                    )),
                }
            }
        }
    )*};
}

list_value!(bool, i16, i32, i64, u32, f32, f64, String, Uuid, Value);

impl ToValue for Vec<&str> {
    fn to_value(&self) -> Result<Value, ConvertError> {
        self.as_slice().to_value()
    }
}

impl ToValue for [&str] {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::List(
            self.iter().map(|s| Value::Text((*s).to_owned())).collect(),
        ))
    }
}
