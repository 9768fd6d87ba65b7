use crate::error::ConvertError;
use crate::value::{FromValue, ToValue, Value};

/// A boolean stored in a `BIT(1)` column.
///
/// Binds as a single byte, `1` for true and `0` for false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitBool(pub bool);

impl From<bool> for BitBool {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<BitBool> for bool {
    fn from(b: BitBool) -> Self {
        b.0
    }
}

impl ToValue for BitBool {
    fn to_value(&self) -> Result<Value, ConvertError> {
        Ok(Value::Bytes(vec![u8::from(self.0)]))
    }
}

impl FromValue for BitBool {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bytes(b) => match b.first() {
                Some(&first) => Ok(Self(first == 1)),
                None => Err(ConvertError::new("empty bit string")),
            },
            Value::Bool(b) => Ok(Self(b)),
            other => Err(ConvertError::incompatible(other.kind(), "BitBool")),
        }
    }
}
