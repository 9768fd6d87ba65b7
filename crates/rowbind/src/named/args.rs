use crate::error::ConvertError;
use crate::record::Record;
use crate::value::{ToValue, Value};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Where named parameter values come from.
pub enum NamedSource<'a> {
    /// String-keyed values looked up by name.
    Map(&'a dyn ArgMap),
    /// A record whose fields are looked up by canonical name.
    Record(&'a dyn Record),
    /// One source per row of a multi-row `INSERT ... VALUES`.
    Batch(Vec<&'a dyn NamedArgs>),
}

/// A value that can supply named query parameters.
///
/// Implemented for string-keyed maps, `serde_json` objects, slices and
/// vectors (as batches), and every `#[derive(Record)]` type.
pub trait NamedArgs {
    fn named_source(&self) -> NamedSource<'_>;
}

/// String-keyed lookup of argument values.
pub trait ArgMap {
    /// Value stored under `key`, `None` when absent.
    fn lookup(&self, key: &str) -> Option<Result<Value, ConvertError>>;

    /// Rendering of the map used in unresolved-name errors.
    fn describe(&self) -> String;
}

impl<K, V, S> ArgMap for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + Hash + Debug,
    V: ToValue,
    S: BuildHasher,
{
    fn lookup(&self, key: &str) -> Option<Result<Value, ConvertError>> {
        self.get(key).map(ToValue::to_value)
    }

    fn describe(&self) -> String {
        describe_keys(self.keys())
    }
}

impl<K, V> ArgMap for BTreeMap<K, V>
where
    K: Borrow<str> + Ord + Debug,
    V: ToValue,
{
    fn lookup(&self, key: &str) -> Option<Result<Value, ConvertError>> {
        self.get(key).map(ToValue::to_value)
    }

    fn describe(&self) -> String {
        describe_keys(self.keys())
    }
}

impl ArgMap for serde_json::Map<String, serde_json::Value> {
    fn lookup(&self, key: &str) -> Option<Result<Value, ConvertError>> {
        self.get(key).map(|v| Ok(Value::from_json(v)))
    }

    fn describe(&self) -> String {
        describe_keys(self.keys())
    }
}

fn describe_keys<K: Debug>(keys: impl Iterator<Item = K>) -> String {
    let keys: Vec<String> = keys.map(|k| format!("{k:?}")).collect();
    format!("map with keys [{}]", keys.join(", "))
}

impl<K, V, S> NamedArgs for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + Hash + Debug,
    V: ToValue,
    S: BuildHasher,
{
    fn named_source(&self) -> NamedSource<'_> {
        NamedSource::Map(self)
    }
}

impl<K, V> NamedArgs for BTreeMap<K, V>
where
    K: Borrow<str> + Ord + Debug,
    V: ToValue,
{
    fn named_source(&self) -> NamedSource<'_> {
        NamedSource::Map(self)
    }
}

impl NamedArgs for serde_json::Map<String, serde_json::Value> {
    fn named_source(&self) -> NamedSource<'_> {
        NamedSource::Map(self)
    }
}

impl<T: NamedArgs> NamedArgs for [T] {
    fn named_source(&self) -> NamedSource<'_> {
        NamedSource::Batch(self.iter().map(|t| t as &dyn NamedArgs).collect())
    }
}

impl<T: NamedArgs> NamedArgs for Vec<T> {
    fn named_source(&self) -> NamedSource<'_> {
        self.as_slice().named_source()
    }
}

impl<T: NamedArgs, const N: usize> NamedArgs for [T; N] {
    fn named_source(&self) -> NamedSource<'_> {
        self.as_slice().named_source()
    }
}

impl<T: NamedArgs + ?Sized> NamedArgs for &T {
    fn named_source(&self) -> NamedSource<'_> {
        (**self).named_source()
    }
}
