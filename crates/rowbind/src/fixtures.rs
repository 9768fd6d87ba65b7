//! Hand-written records shared by unit tests.

use crate::record::{FieldDef, FieldMut, FieldRef, Record, RecordType};

#[derive(Debug, Default, PartialEq)]
pub struct Address {
    pub city: String,
    pub zip: Option<String>,
}

impl Record for Address {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::scalar("City", "String"),
            FieldDef::scalar("Zip", "Option<String>"),
        ]
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<Self>()
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Scalar(&self.city)),
            1 => Some(FieldRef::Scalar(&self.zip)),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(FieldMut::Scalar(&mut self.city)),
            1 => Some(FieldMut::Scalar(&mut self.zip)),
            _ => None,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Audit {
    pub created_by: String,
}

impl Record for Audit {
    fn fields() -> Vec<FieldDef> {
        vec![FieldDef::scalar("CreatedBy", "String").tag("created_by")]
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<Self>()
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Scalar(&self.created_by)),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(FieldMut::Scalar(&mut self.created_by)),
            _ => None,
        }
    }
}

/// Columns: `id`, `name`, `address.city`, `address.zip`, `created_by`.
#[derive(Debug, Default, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: Option<Box<Address>>,
    pub audit: Audit,
}

impl Record for Customer {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::scalar("ID", "i64"),
            FieldDef::scalar("Name", "String"),
            FieldDef::record("Address", RecordType::of::<Address>(), true),
            FieldDef::record("Audit", RecordType::of::<Audit>(), false).embedded(),
        ]
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<Self>()
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Scalar(&self.id)),
            1 => Some(FieldRef::Scalar(&self.name)),
            2 => Some(match &self.address {
                Some(a) => FieldRef::Record(a.as_ref()),
                None => FieldRef::Nil,
            }),
            3 => Some(FieldRef::Record(&self.audit)),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(FieldMut::Scalar(&mut self.id)),
            1 => Some(FieldMut::Scalar(&mut self.name)),
            2 => Some(FieldMut::Record(
                self.address.get_or_insert_with(Default::default).as_mut(),
            )),
            3 => Some(FieldMut::Record(&mut self.audit)),
            _ => None,
        }
    }
}
