//! Column-to-field scan plans.
//!
//! [`prepare`] resolves a result set's column names against a record's
//! [`StructMap`] once; [`ScanPlan::fill`] then writes each row into a record
//! without repeating the name lookups.

use crate::error::{BindError, BindResult};
use crate::mapper::{StructMap, field_by_indexes_mut};
use crate::record::{FieldMut, Record};
use crate::value::Value;

/// Traversal per result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    columns: Vec<String>,
    traversals: Vec<Vec<usize>>,
    missing: Vec<usize>,
}

/// Resolve `columns` against `map`. Columns with no matching field get an
/// empty traversal and are listed in [`ScanPlan::missing`].
pub fn prepare(map: &StructMap, columns: &[impl AsRef<str>]) -> ScanPlan {
    let mut traversals = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for (i, column) in columns.iter().enumerate() {
        let t = map.traversal(column.as_ref());
        if t.is_empty() {
            missing.push(i);
        }
        traversals.push(t.to_vec());
    }

    ScanPlan {
        columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        traversals,
        missing,
    }
}

impl ScanPlan {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn traversals(&self) -> &[Vec<usize>] {
        &self.traversals
    }

    /// Positions of columns with no destination field.
    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    /// Fail on the first column with no destination in `type_name`, unless
    /// `lenient`, in which case those columns are only logged.
    pub fn check(&self, type_name: &str, lenient: bool) -> BindResult<()> {
        let Some(&first) = self.missing.first() else {
            return Ok(());
        };
        if !lenient {
            return Err(BindError::missing_destination(
                &self.columns[first],
                type_name,
            ));
        }

        let dropped: Vec<&str> = self
            .missing
            .iter()
            .map(|&i| self.columns[i].as_str())
            .collect();
        tracing::warn!(
            target: "rowbind",
            record = type_name,
            columns = ?dropped,
            "ignoring columns with no destination field"
        );
        Ok(())
    }

    /// Write one row into `record`, column by column.
    ///
    /// Unset optional sub-records on the way are allocated. Values of missing
    /// columns are discarded.
    pub fn fill(&self, record: &mut dyn Record, row: Vec<Value>) -> BindResult<()> {
        if row.len() != self.traversals.len() {
            return Err(BindError::shape(format!(
                "row has {} values but {} columns were planned",
                row.len(),
                self.traversals.len()
            )));
        }

        let planned = self.traversals.iter().zip(&self.columns);
        for (value, (traversal, column)) in row.into_iter().zip(planned) {
            if traversal.is_empty() {
                continue;
            }
            match field_by_indexes_mut(&mut *record, traversal) {
                Some(FieldMut::Scalar(dst)) => dst
                    .assign(value)
                    .map_err(|e| BindError::decode(column, e.message()))?,
                Some(FieldMut::Record(_)) => {
                    return Err(BindError::shape(format!(
                        "column {column} maps to a sub-record, not a value"
                    )));
                }
                None => {
                    return Err(BindError::shape(format!(
                        "column {column} has no field at {traversal:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}
