//! Named query templates.
//!
//! A template names its parameters with `:name` (dotted names reach into
//! nested records, e.g. `:address.city`). [`compile`] rewrites the template
//! into a backend's placeholder syntax and returns the parameter names in
//! order; the binders then resolve those names against a map, a record, or a
//! batch of records.
//!
//! ```ignore
//! use rowbind::{BindStyle, Record, bind_named, default_mapper};
//!
//! #[derive(Default, Record)]
//! struct Person {
//!     first_name: String,
//!     last_name: String,
//! }
//!
//! let people = vec![
//!     Person { first_name: "Ardie".into(), last_name: "Savea".into() },
//!     Person { first_name: "Sonny Bill".into(), last_name: "Williams".into() },
//! ];
//! let (sql, args) = bind_named(
//!     BindStyle::Dollar,
//!     "INSERT INTO person (first_name, last_name) VALUES (:first_name, :last_name)",
//!     &people,
//!     &default_mapper(),
//! )?;
//! assert_eq!(sql, "INSERT INTO person (first_name, last_name) VALUES ($1, $2),($3, $4)");
//! assert_eq!(args.len(), 4);
//! ```

mod args;
mod bind;
mod compile;

#[cfg(test)]
mod tests;

pub use args::{ArgMap, NamedArgs, NamedSource};
pub use bind::{bind_args, bind_map, bind_named, bind_record, named};
pub use compile::{NamedQuery, compile};
