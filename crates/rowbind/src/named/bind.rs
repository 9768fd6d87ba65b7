use super::args::{ArgMap, NamedArgs, NamedSource};
use super::compile::{NamedQuery, compile};
use crate::dialect::{BindStyle, rebind};
use crate::error::{BindError, BindResult};
use crate::mapper::{Mapper, field_by_indexes};
use crate::record::{FieldRef, Record};
use crate::value::Value;
use regex::Regex;
use std::sync::OnceLock;

fn values_group() -> &'static Regex {
    static VALUES: OnceLock<Regex> = OnceLock::new();
    VALUES.get_or_init(|| {
        Regex::new(r"\)\s*(?i)VALUES\s*\(").expect("invalid built-in VALUES regex")
    })
}

/// Compile `query` for `style` and bind its parameters from `source`.
///
/// Batch sources (slices and vectors) expand the first `VALUES (...)` group
/// of the template once per element, so a single-row `INSERT` template
/// becomes a multi-row insert.
pub fn bind_named(
    style: BindStyle,
    query: &str,
    source: &dyn NamedArgs,
    mapper: &Mapper,
) -> BindResult<(String, Vec<Value>)> {
    match source.named_source() {
        NamedSource::Batch(items) => bind_batch(style, query, &items, mapper),
        single => {
            let (query, names) = compile(query, style)?.into_parts();
            let args = bind_source(&names, single, mapper)?;
            Ok((query, args))
        }
    }
}

impl NamedQuery {
    /// Values for this query's parameters from a single map or record.
    pub fn bind(&self, source: &dyn NamedArgs, mapper: &Mapper) -> BindResult<Vec<Value>> {
        bind_args(self.names(), source, mapper)
    }
}

/// [`bind_named`] with `?` placeholders and the default mapper.
pub fn named(query: &str, source: &dyn NamedArgs) -> BindResult<(String, Vec<Value>)> {
    bind_named(
        BindStyle::Question,
        query,
        source,
        &crate::mapper::default_mapper(),
    )
}

/// Values for `names` from a single map or record source.
pub fn bind_args(
    names: &[String],
    source: &dyn NamedArgs,
    mapper: &Mapper,
) -> BindResult<Vec<Value>> {
    bind_source(names, source.named_source(), mapper)
}

fn bind_source(
    names: &[String],
    source: NamedSource<'_>,
    mapper: &Mapper,
) -> BindResult<Vec<Value>> {
    match source {
        NamedSource::Map(map) => bind_map(names, map),
        NamedSource::Record(record) => bind_record(names, record, mapper),
        NamedSource::Batch(_) => Err(BindError::shape(
            "a batch cannot be bound as a single argument source",
        )),
    }
}

/// Values for `names` looked up by key.
pub fn bind_map(names: &[String], map: &dyn ArgMap) -> BindResult<Vec<Value>> {
    names
        .iter()
        .map(|name| match map.lookup(name) {
            Some(v) => Ok(v?),
            None => Err(BindError::unresolved(name, map.describe())),
        })
        .collect()
}

/// Values for `names` read from the fields of `record`.
///
/// Fields under an unset optional sub-record bind as `NULL`.
pub fn bind_record(
    names: &[String],
    record: &dyn Record,
    mapper: &Mapper,
) -> BindResult<Vec<Value>> {
    let ty = record.record_type();
    let map = mapper.type_map_of(ty);
    names
        .iter()
        .map(|name| {
            let Some(fi) = map.get_by_name(name) else {
                return Err(BindError::unresolved(name, ty.name()));
            };
            // also when the sub-record is unset
            if fi.nested().is_some() {
                return Err(BindError::shape(format!(
                    "name {name} refers to a sub-record of {}, not a value",
                    ty.name()
                )));
            }
            match field_by_indexes(record, &fi.index) {
                Some(FieldRef::Scalar(v)) => Ok(v.to_value()?),
                Some(FieldRef::Nil) => Ok(Value::Null),
                Some(FieldRef::Record(_)) | None => {
                    Err(BindError::unresolved(name, ty.name()))
                }
            }
        })
        .collect()
}

fn bind_batch(
    style: BindStyle,
    query: &str,
    items: &[&dyn NamedArgs],
    mapper: &Mapper,
) -> BindResult<(String, Vec<Value>)> {
    if items.is_empty() {
        return Err(BindError::argument_mismatch("length of batch is 0"));
    }

    let (bound, names) = compile(query, BindStyle::Question)?.into_parts();
    let mut args = Vec::with_capacity(names.len() * items.len());
    for item in items {
        args.extend(bind_source(&names, item.named_source(), mapper)?);
    }

    let mut bound = if items.len() > 1 {
        repeat_values_group(&bound, items.len())
    } else {
        bound
    };
    if !style.is_question() {
        bound = rebind(style, &bound);
    }
    Ok((bound, args))
}

/// Repeat the first `VALUES (...)` group `rows` times in total. Returns the
/// query unchanged when no group is found.
pub(crate) fn repeat_values_group(query: &str, rows: usize) -> String {
    let Some(m) = values_group().find(query) else {
        return query.to_string();
    };
    // the match ends on the group's opening paren
    let opening = m.end() - 1;
    let Some(closing) = closing_paren(&query[opening..]) else {
        return query.to_string();
    };
    let closing = opening + closing;

    let group = &query[opening..=closing];
    let mut out = String::with_capacity(query.len() + (group.len() + 1) * (rows - 1));
    out.push_str(&query[..=closing]);
    for _ in 1..rows {
        out.push(',');
        out.push_str(group);
    }
    out.push_str(&query[closing + 1..]);
    out
}

// byte offset of the paren closing the one at offset 0
fn closing_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
