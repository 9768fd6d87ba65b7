use crate::error::ConvertError;
use crate::value::{FromValue, ToValue, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const EMPTY_JSON: &str = "{}";

/// JSON kept as its raw text.
///
/// An empty document stands for `{}`. Binding validates the text; scanning
/// accepts text, bytes and JSON values without parsing them further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonText(String);

impl Default for JsonText {
    fn default() -> Self {
        Self(EMPTY_JSON.to_string())
    }
}

impl JsonText {
    /// Wrap `text`, falling back to `{}` when it is not valid JSON.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if serde_json::from_str::<serde::de::IgnoredAny>(&text).is_ok() {
            Self(text)
        } else {
            Self::default()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Deserialize the document.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(self.document())
    }

    fn document(&self) -> &str {
        if self.0.is_empty() { EMPTY_JSON } else { &self.0 }
    }
}

impl fmt::Display for JsonText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for JsonText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let doc: serde_json::Value =
            serde_json::from_str(self.document()).map_err(serde::ser::Error::custom)?;
        doc.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = serde_json::Value::deserialize(deserializer)?;
        Ok(Self(doc.to_string()))
    }
}

impl ToValue for JsonText {
    fn to_value(&self) -> Result<Value, ConvertError> {
        serde_json::from_str(self.document())
            .map(Value::Json)
            .map_err(|e| ConvertError::new(format!("invalid json: {e}")))
    }
}

impl FromValue for JsonText {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Text(s) => Ok(Self(s)),
            Value::Bytes(b) if b.is_empty() => Ok(Self::default()),
            Value::Bytes(b) => String::from_utf8(b)
                .map(Self)
                .map_err(|e| ConvertError::new(format!("json bytes are not utf-8: {e}"))),
            Value::Json(v) => Ok(Self(v.to_string())),
            Value::Null => Ok(Self::default()),
            other => Err(ConvertError::incompatible(other.kind(), "JsonText")),
        }
    }
}

/// A [`JsonText`] that may be SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NullJsonText {
    pub json: JsonText,
    pub valid: bool,
}

impl NullJsonText {
    pub fn new(json: JsonText) -> Self {
        Self { json, valid: true }
    }

    pub fn null() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&JsonText> {
        self.valid.then_some(&self.json)
    }
}

impl ToValue for NullJsonText {
    fn to_value(&self) -> Result<Value, ConvertError> {
        if self.valid {
            self.json.to_value()
        } else {
            Ok(Value::Null)
        }
    }
}

impl FromValue for NullJsonText {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        if value.is_null() {
            return Ok(Self::null());
        }
        JsonText::from_value(value).map(Self::new)
    }
}
