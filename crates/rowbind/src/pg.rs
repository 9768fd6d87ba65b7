//! `tokio-postgres` glue: binding [`Value`]s and decoding result rows.

use crate::error::{BindError, BindResult};
use crate::rows::Cursor;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::VecDeque;
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};
use uuid::Uuid;

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql_checked(ty, out),
                Type::OID => u32::try_from(*i)?.to_sql_checked(ty, out),
                Type::CHAR => i8::try_from(*i)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql_checked(ty, out),
                _ => i.to_sql_checked(ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql_checked(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            Value::Text(s) => match *ty {
                Type::JSON | Type::JSONB => {
                    serde_json::from_str::<serde_json::Value>(s)?.to_sql_checked(ty, out)
                }
                Type::UUID => Uuid::parse_str(s)?.to_sql_checked(ty, out),
                _ => s.as_str().to_sql_checked(ty, out),
            },
            Value::Bytes(b) => b.as_slice().to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(t) => t.to_sql_checked(ty, out),
            Value::TimestampTz(t) => t.to_sql_checked(ty, out),
            Value::Uuid(u) => u.to_sql_checked(ty, out),
            Value::List(items) => items.as_slice().to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// Borrow bind values as `tokio-postgres` parameters.
pub fn params(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Column names of a row.
pub fn columns(row: &Row) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> BindResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| BindError::decode(row.columns()[idx].name(), e.to_string()))
}

fn list<'a, T, F>(row: &'a Row, idx: usize, f: F) -> BindResult<Value>
where
    T: FromSql<'a>,
    F: Fn(T) -> Value,
{
    Ok(get::<Vec<Option<T>>>(row, idx)?
        .map(|items| {
            Value::List(
                items
                    .into_iter()
                    .map(|item| item.map(&f).unwrap_or(Value::Null))
                    .collect(),
            )
        })
        .unwrap_or(Value::Null))
}

/// Decode one column into a [`Value`] by its Postgres type.
pub fn column_value(row: &Row, idx: usize) -> BindResult<Value> {
    let column = &row.columns()[idx];
    let value = match *column.type_() {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::CHAR => get::<i8>(row, idx)?.map(|v| Value::Int(v.into())),
        Type::INT2 => get::<i16>(row, idx)?.map(|v| Value::Int(v.into())),
        Type::INT4 => get::<i32>(row, idx)?.map(|v| Value::Int(v.into())),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::Int),
        Type::OID => get::<u32>(row, idx)?.map(|v| Value::Int(v.into())),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| Value::Float(v.into())),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, idx)?.map(Value::Text)
        }
        Type::BYTEA => get::<Vec<u8>>(row, idx)?.map(Value::Bytes),
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx)?.map(Value::Json),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(Value::Timestamp),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(Value::TimestampTz),
        Type::UUID => get::<Uuid>(row, idx)?.map(Value::Uuid),
        Type::BOOL_ARRAY => return list::<bool, _>(row, idx, Value::Bool),
        Type::INT2_ARRAY => return list::<i16, _>(row, idx, |v| Value::Int(v.into())),
        Type::INT4_ARRAY => return list::<i32, _>(row, idx, |v| Value::Int(v.into())),
        Type::INT8_ARRAY => return list::<i64, _>(row, idx, Value::Int),
        Type::FLOAT8_ARRAY => return list::<f64, _>(row, idx, Value::Float),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => {
            return list::<String, _>(row, idx, Value::Text);
        }
        Type::UUID_ARRAY => return list::<Uuid, _>(row, idx, Value::Uuid),
        ref other => {
            return Err(BindError::decode(
                column.name(),
                format!("unsupported column type {other}"),
            ));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Decode every column of a row.
pub fn row_values(row: &Row) -> BindResult<Vec<Value>> {
    (0..row.len()).map(|idx| column_value(row, idx)).collect()
}

/// [`Cursor`] over rows returned by `tokio-postgres`.
///
/// Column names are read from the first row, so an empty result reports no
/// columns. Use the statement's `columns()` when names are needed for a
/// result that may be empty.
pub struct PgCursor {
    columns: Vec<String>,
    rows: VecDeque<Row>,
}

impl PgCursor {
    pub fn new(rows: Vec<Row>) -> Self {
        let columns = rows.first().map(columns).unwrap_or_default();
        Self {
            columns,
            rows: rows.into(),
        }
    }
}

impl Cursor for PgCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<BindResult<Vec<Value>>> {
        self.rows.pop_front().map(|row| row_values(&row))
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}
