//! # rowbind
//!
//! Data binding between Rust records and SQL backends.
//!
//! ## Features
//!
//! - **Bind dialects**: write `?` once, run on backends that expect `$1`,
//!   `:arg1` or `@p1` ([`rebind`], [`DialectTable`])
//! - **Named queries**: `:name` templates compiled into positional ones and
//!   bound from maps, records or batches of records ([`compile`], [`bind_named`])
//! - **`IN` expansion**: list arguments expand into `?, ?, ?` ([`expand_in`])
//! - **Record mapping**: `#[derive(Record)]` describes a struct's fields,
//!   including nested and embedded sub-records; the resulting [`StructMap`]
//!   is built once per type and cached ([`Mapper`])
//! - **Scanning**: result columns resolved to field traversals once per
//!   result set and reused for every row ([`Rows`], [`ScanPlan`])
//! - **tokio-postgres adapter**: [`Db`], [`NamedStmt`] and [`GenericClient`]
//!
//! ## Example
//!
//! ```ignore
//! use rowbind::{BindStyle, Db, DbConfig, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct Person {
//!     id: i64,
//!     #[record(rename = "first_name")]
//!     first: String,
//!     #[record(nested)]
//!     address: Option<Address>,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct Address {
//!     city: String,
//! }
//!
//! let db = Db::with_config(client, DbConfig::for_driver("postgres"));
//! let people: Vec<Person> = db
//!     .select(
//!         r#"SELECT p.id, p.first_name, a.city AS "address.city"
//!            FROM person p LEFT JOIN address a ON a.person_id = p.id
//!            WHERE p.id > ?"#,
//!         &[10.into()],
//!     )
//!     .await?;
//! ```

pub mod client;
pub mod db;
pub mod dialect;
pub mod error;
pub mod expand;
pub mod mapper;
pub mod named;
pub mod pg;
pub mod record;
pub mod rows;
pub mod scan;
pub mod types;
pub mod value;

pub mod prelude;

#[cfg(test)]
mod fixtures;

pub use client::GenericClient;
pub use db::{Db, DbConfig, NamedStmt};
pub use dialect::{BindStyle, DialectTable, bind_style, rebind, register_driver};
pub use error::{BindError, BindResult, ConvertError};
pub use expand::{expand_in, expand_values};
pub use mapper::{
    FieldInfo, Mapper, MapperConfig, StructMap, default_mapper, field_by_indexes,
    field_by_indexes_mut, set_name_fn,
};
pub use named::{
    ArgMap, NamedArgs, NamedQuery, NamedSource, bind_args, bind_map, bind_named, bind_record,
    compile, named,
};
pub use pg::PgCursor;
pub use record::{FieldDef, FieldMut, FieldRef, Record, RecordType};
pub use rows::{
    Cursor, MemoryCursor, Rows, scan_all, scan_maps, scan_one, scan_scalar, scan_scalars,
};
pub use scan::{ScanPlan, prepare};
pub use value::{Assign, FromValue, ToValue, Value};

#[cfg(feature = "derive")]
pub use rowbind_derive::Record;
