//! Column adapter types.
//!
//! Small wrappers for values whose database representation differs from the
//! obvious Rust one: bit columns read as booleans, JSON kept as raw text,
//! and text stored gzip-compressed.

mod bit;
mod gzip;
mod json;

pub use bit::BitBool;
pub use gzip::GzippedText;
pub use json::{JsonText, NullJsonText};
