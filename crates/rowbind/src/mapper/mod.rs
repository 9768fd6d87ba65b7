//! Record type mapping.
//!
//! A [`Mapper`] turns a record type's field descriptors into a [`StructMap`]:
//! every reachable field (nested and embedded sub-records included) with its
//! dotted path and traversal. Maps are built on first use and cached per type.
//!
//! Field naming follows three rules:
//!
//! - a field tag (`#[record(rename = "...")]`) wins, `-` excludes the field;
//! - otherwise the mapper's name transform is applied (lowercase by default);
//! - fields of an embedded sub-record are promoted into the parent's
//!   namespace unless the embedding itself carries a tag, in which case they
//!   are prefixed with it like a nested record.

mod config;
mod struct_map;


pub use config::{MapperConfig, NameFn};
pub use struct_map::{FieldInfo, StructMap};

use crate::error::{BindError, BindResult};
use crate::record::{FieldMut, FieldRef, Record, RecordType};
use crate::value::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Caching builder of [`StructMap`]s.
///
/// Safe to share between threads. Two threads resolving the same type at the
/// same time may both build it; the first map stored is the one kept.
#[derive(Debug, Default)]
pub struct Mapper {
    config: MapperConfig,
    cache: RwLock<HashMap<TypeId, Arc<StructMap>>>,
}

impl Mapper {
    /// A mapper with the given naming policy.
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A mapper that applies `f` to declared field names.
    pub fn with_name_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(MapperConfig::new().name_fn(f))
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Field map of `T`.
    pub fn type_map<T: Record>(&self) -> Arc<StructMap> {
        self.type_map_of(RecordType::of::<T>())
    }

    /// Field map of a record type, built on first use.
    pub fn type_map_of(&self, ty: RecordType) -> Arc<StructMap> {
        if let Some(map) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&ty.id())
        {
            return map.clone();
        }

        let built = Arc::new(StructMap::build(ty, &self.config));
        tracing::debug!(
            target: "rowbind",
            record = ty.name(),
            fields = built.fields().count(),
            "built record field map"
        );

        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(ty.id())
            .or_insert(built)
            .clone()
    }

    /// Traversal of each name in `names`; empty for names with no field.
    pub fn traversals_by_name(&self, ty: RecordType, names: &[impl AsRef<str>]) -> Vec<Vec<usize>> {
        let map = self.type_map_of(ty);
        names
            .iter()
            .map(|n| map.traversal(n.as_ref()).to_vec())
            .collect()
    }

    /// Call `f` with the position and traversal of each name, stopping at the
    /// first error. Names with no field get an empty traversal.
    pub fn traversals_by_name_with<F>(
        &self,
        ty: RecordType,
        names: &[impl AsRef<str>],
        mut f: F,
    ) -> BindResult<()>
    where
        F: FnMut(usize, &[usize]) -> BindResult<()>,
    {
        let map = self.type_map_of(ty);
        for (i, name) in names.iter().enumerate() {
            f(i, map.traversal(name.as_ref()))?;
        }
        Ok(())
    }

    /// Value of the field called `name` in `record`, `None` if there is no
    /// such field. Fields under an unset optional sub-record read as `Null`.
    pub fn field_by_name(&self, record: &dyn Record, name: &str) -> BindResult<Option<Value>> {
        let map = self.type_map_of(record.record_type());
        let Some(fi) = map.get_by_name(name) else {
            return Ok(None);
        };
        read_field(record, fi)
    }

    /// [`field_by_name`](Self::field_by_name) for several names.
    pub fn fields_by_name(
        &self,
        record: &dyn Record,
        names: &[impl AsRef<str>],
    ) -> BindResult<Vec<Option<Value>>> {
        let map = self.type_map_of(record.record_type());
        names
            .iter()
            .map(|name| match map.get_by_name(name.as_ref()) {
                Some(fi) => read_field(record, fi),
                None => Ok(None),
            })
            .collect()
    }

    /// Every named scalar field of `record`, keyed by canonical name.
    pub fn field_map(&self, record: &dyn Record) -> BindResult<HashMap<String, Value>> {
        let map = self.type_map_of(record.record_type());
        let mut out = HashMap::new();
        for fi in map.fields() {
            if fi.nested().is_some() {
                continue;
            }
            // shadowed fields share a path with the field that owns the name
            match map.get_by_name(&fi.path) {
                Some(owner) if owner.index == fi.index => {}
                _ => continue,
            }
            if let Some(v) = read_field(record, fi)? {
                out.insert(fi.path.clone(), v);
            }
        }
        Ok(out)
    }
}

fn read_field(record: &dyn Record, fi: &FieldInfo) -> BindResult<Option<Value>> {
    let shape = || {
        BindError::shape(format!(
            "field {} of {} is a record, not a value",
            fi.path,
            record.record_type().name()
        ))
    };
    // also when the sub-record is unset
    if fi.nested().is_some() {
        return Err(shape());
    }
    match field_by_indexes(record, &fi.index) {
        Some(FieldRef::Scalar(v)) => Ok(Some(v.to_value()?)),
        Some(FieldRef::Nil) => Ok(Some(Value::Null)),
        Some(FieldRef::Record(_)) => Err(shape()),
        None => Ok(None),
    }
}

/// Walk `index` through `record` without allocating.
///
/// Stops with [`FieldRef::Nil`] at the first unset optional sub-record.
pub fn field_by_indexes<'a>(record: &'a dyn Record, index: &[usize]) -> Option<FieldRef<'a>> {
    let (last, init) = index.split_last()?;
    let mut cur = record;
    for &i in init {
        match cur.field(i)? {
            FieldRef::Record(next) => cur = next,
            FieldRef::Nil => return Some(FieldRef::Nil),
            FieldRef::Scalar(_) => return None,
        }
    }
    cur.field(*last)
}

/// Walk `index` through `record`, allocating unset optional sub-records on
/// the way, and return the leaf as a write target.
pub fn field_by_indexes_mut<'a>(
    mut record: &'a mut dyn Record,
    index: &[usize],
) -> Option<FieldMut<'a>> {
    let (last, init) = index.split_last()?;
    for &i in init {
        match record.field_mut(i)? {
            FieldMut::Record(next) => record = next,
            FieldMut::Scalar(_) => return None,
        }
    }
    record.field_mut(*last)
}

fn default_slot() -> &'static RwLock<Arc<Mapper>> {
    static DEFAULT: OnceLock<RwLock<Arc<Mapper>>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(Arc::new(Mapper::new(MapperConfig::lowercase()))))
}

/// The process-wide mapper (lowercased field names unless changed with
/// [`set_name_fn`]).
pub fn default_mapper() -> Arc<Mapper> {
    default_slot()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Replace the process-wide naming policy.
///
/// Cached field maps are dropped with the old mapper; callers still holding
/// it keep their old maps.
pub fn set_name_fn<F>(f: F)
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    set_default_mapper(Mapper::with_name_fn(f));
}

/// Replace the process-wide mapper.
pub fn set_default_mapper(mapper: Mapper) {
    tracing::debug!(target: "rowbind", config = ?mapper.config(), "replace default mapper");
    *default_slot().write().unwrap_or_else(|e| e.into_inner()) = Arc::new(mapper);
}
