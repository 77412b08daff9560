use rusqlite::types::Value as SqliteValue;

use crate::error::SqlAccessError;
use crate::types::Value;

/// Convert a bound value to its rusqlite representation.
///
/// The binder flattens timestamps and JSON to text before a driver sees
/// them, so the interesting cases here are the primitives.
#[must_use]
pub fn to_sqlite_value(value: &Value) -> SqliteValue {
    match value {
        Value::Int(i) => SqliteValue::Integer(*i),
        Value::Float(f) => SqliteValue::Real(*f),
        Value::Text(s) => SqliteValue::Text(s.clone()),
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Null => SqliteValue::Null,
        Value::Timestamp(dt) => SqliteValue::Text(dt.format("%F %T%.f").to_string()),
        Value::Json(json) => SqliteValue::Text(json.to_string()),
    }
}

/// Convert a fetched rusqlite value into a [`Value`].
///
/// # Errors
///
/// Returns `SqlAccessError::Unimplemented` for binary columns, which have no
/// counterpart in this layer's value model.
pub fn value_from_sqlite(value: SqliteValue) -> Result<Value, SqlAccessError> {
    match value {
        SqliteValue::Null => Ok(Value::Null),
        SqliteValue::Integer(i) => Ok(Value::Int(i)),
        SqliteValue::Real(f) => Ok(Value::Float(f)),
        SqliteValue::Text(s) => Ok(Value::Text(s)),
        SqliteValue::Blob(_) => Err(SqlAccessError::Unimplemented(
            "binary columns are not supported".into(),
        )),
    }
}
