use crate::error::ConvertError;
use crate::value::{FromValue, ToValue, Value};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Text stored gzip-compressed in a binary column.
///
/// Holds the uncompressed content; compression happens on bind and
/// decompression on scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GzippedText(Vec<u8>);

impl GzippedText {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self(content.into())
    }

    /// Uncompressed content.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl ToValue for GzippedText {
    fn to_value(&self) -> Result<Value, ConvertError> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(self.0.len()), Compression::default());
        encoder
            .write_all(&self.0)
            .and_then(|_| encoder.finish())
            .map(Value::Bytes)
            .map_err(|e| ConvertError::new(format!("gzip: {e}")))
    }
}

impl FromValue for GzippedText {
    fn from_value(value: Value) -> Result<Self, ConvertError> {
        let compressed = match value {
            Value::Bytes(b) => b,
            Value::Text(s) => s.into_bytes(),
            other => return Err(ConvertError::incompatible(other.kind(), "GzippedText")),
        };

        let mut content = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut content)
            .map_err(|e| ConvertError::new(format!("gzip: {e}")))?;
        Ok(Self(content))
    }
}
