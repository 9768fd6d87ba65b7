//! Error types for rowbind

use thiserror::Error;

/// Result type alias for rowbind operations
pub type BindResult<T> = Result<T, BindError>;

/// Failure converting between a [`Value`](crate::Value) and a Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConvertError {
    message: String,
}

impl ConvertError {
    /// Create a conversion error with a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A value of kind `from` cannot be stored in a `to`.
    pub fn incompatible(from: &str, to: &str) -> Self {
        Self::new(format!("cannot convert {from} into {to}"))
    }

    /// The conversion message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error types for compiling, binding and scanning
#[derive(Debug, Error)]
pub enum BindError {
    /// Unescaped `:` while reading a named parameter
    #[error("unexpected `:` while reading named param at {position}")]
    MalformedTemplate { position: usize },

    /// Placeholder count and argument count disagree, or a sequence is empty
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// A named parameter with no matching field or map key
    #[error("could not find name {name} in {source_desc}")]
    UnresolvedName { name: String, source_desc: String },

    /// A result column with no matching destination field
    #[error("missing destination name {column} in {type_name}")]
    MissingDestination { column: String, type_name: String },

    /// Destination or source has the wrong shape
    #[error("shape error: {0}")]
    Shape(String),

    /// Column value could not be stored in its destination field
    #[error("decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Argument could not produce its bind representation
    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Query returned no rows where one was required
    #[error("no rows in result set")]
    NoRows,

    /// Error reported by the result cursor
    #[error("cursor error: {0}")]
    Cursor(String),

    /// Query execution error
    #[error("query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("pool error: {0}")]
    Pool(String),
}

impl BindError {
    /// Create an argument mismatch error
    pub fn argument_mismatch(message: impl Into<String>) -> Self {
        Self::ArgumentMismatch(message.into())
    }

    /// Create an unresolved name error
    pub fn unresolved(name: impl Into<String>, source_desc: impl Into<String>) -> Self {
        Self::UnresolvedName {
            name: name.into(),
            source_desc: source_desc.into(),
        }
    }

    /// Create a missing destination error
    pub fn missing_destination(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::MissingDestination {
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a shape error
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a malformed template error
    pub fn is_malformed_template(&self) -> bool {
        matches!(self, Self::MalformedTemplate { .. })
    }

    /// Check if this is an argument mismatch error
    pub fn is_argument_mismatch(&self) -> bool {
        matches!(self, Self::ArgumentMismatch(_))
    }

    /// Check if this is an unresolved name error
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedName { .. })
    }

    /// Check if this is a missing destination error
    pub fn is_missing_destination(&self) -> bool {
        matches!(self, Self::MissingDestination { .. })
    }

    /// Check if this is a no rows error
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for BindError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
