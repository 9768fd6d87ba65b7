//! Record field descriptors.
//!
//! A record type describes its fields once through [`Record::fields`] and
//! exposes them by position through [`Record::field`] / [`Record::field_mut`].
//! The descriptors are normally generated by `#[derive(Record)]`:
//!
//! ```ignore
//! use rowbind::Record;
//!
//! #[derive(Default, Record)]
//! struct Person {
//!     id: i64,
//!     #[record(rename = "first_name")]
//!     first: String,
//!     #[record(skip)]
//!     cached: Option<String>,
//!     #[record(nested)]
//!     address: Option<Box<Address>>,
//! }
//! ```

use crate::value::{Assign, ToValue};
use std::any::TypeId;
use std::fmt;

/// Identity and field table of a record type.
#[derive(Clone, Copy)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
    fields: fn() -> Vec<FieldDef>,
}

impl RecordType {
    pub fn of<T: Record>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            fields: T::fields,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field descriptors in declaration order.
    pub fn fields(&self) -> Vec<FieldDef> {
        (self.fields)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

/// Declaration of one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field name as declared in Rust.
    pub name: &'static str,
    /// Raw override tag, `"column,opt1,opt2=value"`. `"-"` excludes the field.
    pub tag: Option<&'static str>,
    /// Rust type name of the field.
    pub type_name: &'static str,
    /// Sub-record fields are promoted into the parent's namespace.
    pub embedded: bool,
    /// Record type of a nested or embedded sub-record.
    pub nested: Option<RecordType>,
    /// The sub-record sits behind an `Option` and is allocated on write.
    pub optional: bool,
}

impl FieldDef {
    /// A plain scalar field.
    pub const fn scalar(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            tag: None,
            type_name,
            embedded: false,
            nested: None,
            optional: false,
        }
    }

    /// A nested sub-record field.
    pub fn record(name: &'static str, nested: RecordType, optional: bool) -> Self {
        Self {
            name,
            tag: None,
            type_name: nested.name(),
            embedded: false,
            nested: Some(nested),
            optional,
        }
    }

    /// Attach an override tag.
    pub const fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Mark a sub-record as embedded.
    pub const fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// Read access to one field.
pub enum FieldRef<'a> {
    Scalar(&'a dyn ToValue),
    Record(&'a dyn Record),
    /// An optional sub-record that is not set.
    Nil,
}

/// Write access to one field.
pub enum FieldMut<'a> {
    Scalar(&'a mut dyn Assign),
    Record(&'a mut dyn Record),
}

/// A structured record that can be bound from and scanned into.
pub trait Record: 'static {
    /// Field descriptors in declaration order.
    fn fields() -> Vec<FieldDef>
    where
        Self: Sized;

    /// Runtime identity of the concrete type.
    fn record_type(&self) -> RecordType;

    /// Field at declaration position `index`.
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;

    /// Mutable field at declaration position `index`, allocating an unset
    /// optional sub-record.
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;
}
