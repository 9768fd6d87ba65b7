//! Derive macros for rowbind
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod record;

/// Derive the `Record` field table for a struct, plus `NamedArgs` so the
/// struct can be passed directly as a named-query source.
///
/// # Example
///
/// ```ignore
/// use rowbind::Record;
///
/// #[derive(Default, Record)]
/// struct Person {
///     id: i64,
///     #[record(rename = "first_name")]
///     first: String,
///     #[record(skip)]
///     cached: Option<String>,
///     #[record(nested)]
///     address: Option<Box<Address>>,
///     #[record(embed)]
///     audit: Audit,
/// }
/// ```
///
/// # Attributes
///
/// - `#[record(rename = "name")]` - Column name; text after a comma is parsed
///   as options (`"name,opt,key=value"`). `"-"` excludes the field.
/// - `#[record(skip)]` - Exclude the field
/// - `#[record(nested)]` - The field is a sub-record (`T`, `Box<T>`,
///   `Option<T>` or `Option<Box<T>>`); its columns are prefixed with the
///   field name, e.g. `address.city`
/// - `#[record(embed)]` - Like `nested`, but the sub-record's fields are
///   promoted into this record's namespace
///
/// Scalar fields must implement `ToValue` and `FromValue`. Optional
/// sub-records are allocated with `Default` when scanned into.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
