//! Result cursors and row iteration.

use crate::error::{BindError, BindResult};
use crate::mapper::{Mapper, default_mapper};
use crate::record::{Record, RecordType};
use crate::scan::{ScanPlan, prepare};
use crate::value::{FromValue, Value};
use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A forward-only result cursor.
pub trait Cursor {
    /// Column names in result order.
    fn columns(&self) -> &[String];

    /// The next row, `None` once the result is exhausted.
    fn next_row(&mut self) -> Option<BindResult<Vec<Value>>>;

    /// Release the cursor. Called at most once by [`Rows`].
    fn close(&mut self) {}
}

/// Rows already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    closed: bool,
}

impl MemoryCursor {
    pub fn new<S>(columns: impl IntoIterator<Item = S>, rows: Vec<Vec<Value>>) -> Self
    where
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Cursor for MemoryCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<BindResult<Vec<Value>>> {
        if self.closed {
            return None;
        }
        self.rows.pop_front().map(Ok)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Row iterator that scans into records.
///
/// The scan plan for a destination type is computed on the first scan and
/// reused for every following row of the same type.
pub struct Rows<C: Cursor> {
    cursor: C,
    mapper: Arc<Mapper>,
    lenient: bool,
    plan: Option<(TypeId, ScanPlan)>,
    closed: bool,
}

impl<C: Cursor> Rows<C> {
    /// Rows scanned with the process-wide default mapper.
    pub fn new(cursor: C) -> Self {
        Self::with_mapper(cursor, default_mapper())
    }

    pub fn with_mapper(cursor: C, mapper: Arc<Mapper>) -> Self {
        Self {
            cursor,
            mapper,
            lenient: false,
            plan: None,
            closed: false,
        }
    }

    /// Ignore result columns that have no destination field.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn columns(&self) -> &[String] {
        self.cursor.columns()
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    /// Next row as raw values. Closes the cursor once exhausted.
    pub fn next_values(&mut self) -> Option<BindResult<Vec<Value>>> {
        if self.closed {
            return None;
        }
        let row = self.cursor.next_row();
        if row.is_none() {
            self.close();
        }
        row
    }

    /// Scan the next row into `dest`. Returns `false` once exhausted.
    pub fn scan_next(&mut self, dest: &mut dyn Record) -> BindResult<bool> {
        let Some(row) = self.next_values() else {
            return Ok(false);
        };
        let row = row?;
        let plan = self.plan_for(dest.record_type())?;
        plan.fill(dest, row)?;
        Ok(true)
    }

    /// Scan the next row into a new `T`.
    pub fn next_record<T: Record + Default>(&mut self) -> Option<BindResult<T>> {
        let mut dest = T::default();
        match self.scan_next(&mut dest) {
            Ok(true) => Some(Ok(dest)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }

    /// Scan the next row's single column into `T`.
    pub fn next_scalar<T: FromValue>(&mut self) -> Option<BindResult<T>> {
        let row = match self.next_values()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        if row.len() != 1 {
            return Some(Err(BindError::shape(format!(
                "scalar destination {} with {} columns",
                std::any::type_name::<T>(),
                row.len()
            ))));
        }
        let column = self.columns().first().cloned().unwrap_or_default();
        let value = row.into_iter().next().unwrap_or_default();
        Some(T::from_value(value).map_err(|e| BindError::decode(column, e.message())))
    }

    /// Next row keyed by column name. A later duplicate column overwrites an
    /// earlier one.
    pub fn next_map(&mut self) -> Option<BindResult<HashMap<String, Value>>> {
        let row = match self.next_values()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        let columns = self.cursor.columns();
        if row.len() != columns.len() {
            return Some(Err(BindError::shape(format!(
                "row has {} values but the result has {} columns",
                row.len(),
                columns.len()
            ))));
        }
        Some(Ok(columns.iter().cloned().zip(row).collect()))
    }

    /// Release the cursor. Further reads return `None`.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.cursor.close();
        }
    }

    fn plan_for(&mut self, ty: RecordType) -> BindResult<&ScanPlan> {
        let cached = matches!(&self.plan, Some((id, _)) if *id == ty.id());
        if !cached {
            let map = self.mapper.type_map_of(ty);
            let plan = prepare(&map, self.cursor.columns());
            plan.check(ty.name(), self.lenient)?;
            tracing::trace!(
                target: "rowbind",
                record = ty.name(),
                columns = plan.columns().len(),
                "prepared scan plan"
            );
            self.plan = Some((ty.id(), plan));
        }
        match &self.plan {
            Some((_, plan)) => Ok(plan),
            None => Err(BindError::shape("scan plan unavailable")),
        }
    }
}

impl<C: Cursor> Drop for Rows<C> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Scan every remaining row into a `T`.
pub fn scan_all<T, C>(rows: &mut Rows<C>) -> BindResult<Vec<T>>
where
    T: Record + Default,
    C: Cursor,
{
    let mut out = Vec::new();
    while let Some(record) = rows.next_record::<T>() {
        out.push(record?);
    }
    Ok(out)
}

/// Scan the first row into a `T` and close the rows.
pub fn scan_one<T, C>(rows: &mut Rows<C>) -> BindResult<T>
where
    T: Record + Default,
    C: Cursor,
{
    let first = rows.next_record::<T>();
    rows.close();
    first.unwrap_or(Err(BindError::NoRows))
}

/// Every remaining row's single column as a `T`.
pub fn scan_scalars<T, C>(rows: &mut Rows<C>) -> BindResult<Vec<T>>
where
    T: FromValue,
    C: Cursor,
{
    let mut out = Vec::new();
    while let Some(value) = rows.next_scalar::<T>() {
        out.push(value?);
    }
    Ok(out)
}

/// Every remaining row keyed by column name.
pub fn scan_maps<C: Cursor>(rows: &mut Rows<C>) -> BindResult<Vec<HashMap<String, Value>>> {
    let mut out = Vec::new();
    while let Some(row) = rows.next_map() {
        out.push(row?);
    }
    Ok(out)
}

/// The first row's single column as a `T`.
pub fn scan_scalar<T, C>(rows: &mut Rows<C>) -> BindResult<T>
where
    T: FromValue,
    C: Cursor,
{
    let first = rows.next_scalar::<T>();
    rows.close();
    first.unwrap_or(Err(BindError::NoRows))
}
