//! `IN (?)` expansion of sequence arguments.

use crate::error::{BindError, BindResult};
use crate::value::{ToValue, Value};

/// Expand sequence arguments into repeated `?` placeholders.
///
/// Each argument is converted with [`ToValue`] first. A [`Value::List`]
/// consumes one `?` and emits one placeholder per element; every other value
/// (including [`Value::Bytes`]) consumes one `?` unchanged. The query must use
/// the `?` placeholder; rebind afterwards for other dialects.
///
/// ```
/// use rowbind::{expand_in, ToValue, Value};
///
/// let ids = vec![1, 2, 3];
/// let (sql, args) = expand_in("SELECT * FROM t WHERE id IN (?)", &[&ids]).unwrap();
/// assert_eq!(sql, "SELECT * FROM t WHERE id IN (?, ?, ?)");
/// assert_eq!(args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
/// ```
pub fn expand_in(query: &str, args: &[&dyn ToValue]) -> BindResult<(String, Vec<Value>)> {
    let values = args
        .iter()
        .map(|a| a.to_value())
        .collect::<Result<Vec<_>, _>>()?;
    expand_values(query, values)
}

/// [`expand_in`] for arguments that are already [`Value`]s.
///
/// When no argument is a list the input is returned as-is, so placeholder
/// count mismatches are only reported once at least one list is present.
pub fn expand_values(query: &str, args: Vec<Value>) -> BindResult<(String, Vec<Value>)> {
    let mut any_lists = false;
    let mut flat_count = 0usize;
    for arg in &args {
        match arg.as_list() {
            Some([]) => {
                return Err(BindError::argument_mismatch(
                    "empty slice passed to 'in' query",
                ));
            }
            Some(items) => {
                any_lists = true;
                flat_count += items.len();
            }
            None => flat_count += 1,
        }
    }

    if !any_lists {
        return Ok((query.to_string(), args));
    }

    let arg_count = args.len();
    let mut flat = Vec::with_capacity(flat_count);
    let mut out = String::with_capacity(query.len() + ", ?".len() * flat_count);
    let mut consumed = 0usize;
    let mut rest = query;
    let mut args = args.into_iter();

    while let Some(i) = rest.find('?') {
        let Some(arg) = args.next() else {
            return Err(BindError::argument_mismatch(
                "number of bindVars exceeds arguments",
            ));
        };
        consumed += 1;

        out.push_str(&rest[..=i]);
        rest = &rest[i + 1..];

        match arg {
            Value::List(items) => {
                for _ in 1..items.len() {
                    out.push_str(", ?");
                }
                flat.extend(items);
            }
            scalar => flat.push(scalar),
        }
    }
    out.push_str(rest);

    if consumed < arg_count {
        return Err(BindError::argument_mismatch(
            "number of bindVars less than number arguments",
        ));
    }

    tracing::trace!(target: "rowbind", sql = %out, args = flat.len(), "expand in");
    Ok((out, flat))
}
