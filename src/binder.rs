//! Value-to-wire binding dispatch.
//!
//! `to_wire` is the base dispatch: it decides the driver type tag and flattens
//! timestamps and JSON into text once, so drivers only ever see
//! Int/Float/Text/Bool/Null. The MySQL dialect normalizes first (booleans to
//! 0/1, blank strings to NULL, timestamps to a fixed format) and then falls
//! through to the same dispatch.

use crate::driver::DriverStatement;
use crate::error::SqlAccessError;
use crate::types::{BindDialect, ParamType, Params, Value};

/// Timestamp format used by the base dispatch (subsecond-precision).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
/// Timestamp format MySQL columns expect (no subseconds).
const MYSQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl BindDialect {
    /// Normalize a value before the base dispatch runs.
    #[must_use]
    pub fn normalize(&self, value: Value) -> Value {
        match self {
            BindDialect::Generic => value,
            BindDialect::MySql => match value {
                // No native boolean column type
                Value::Bool(b) => Value::Int(i64::from(b)),
                // Blank text means NULL for optional text/numeric columns
                Value::Text(s) if s.trim().is_empty() => Value::Null,
                Value::Timestamp(dt) => {
                    Value::Text(dt.format(MYSQL_TIMESTAMP_FORMAT).to_string())
                }
                other => other,
            },
        }
    }
}

/// Map a value to the wire value and driver type tag the statement receives.
///
/// Precedence: integer binds as INT; string or float as STR; boolean as BOOL;
/// null as NULL; JSON serializes to text and binds as STR; timestamps format
/// to text and bind as STR.
#[must_use]
pub fn to_wire(value: &Value) -> (Value, ParamType) {
    match value {
        Value::Int(i) => (Value::Int(*i), ParamType::Int),
        Value::Float(f) => (Value::Float(*f), ParamType::Str),
        Value::Text(s) => (Value::Text(s.clone()), ParamType::Str),
        Value::Bool(b) => (Value::Bool(*b), ParamType::Bool),
        Value::Null => (Value::Null, ParamType::Null),
        Value::Timestamp(dt) => (
            Value::Text(dt.format(TIMESTAMP_FORMAT).to_string()),
            ParamType::Str,
        ),
        Value::Json(json) => (Value::Text(json.to_string()), ParamType::Str),
    }
}

/// Bind one named value through the dialect's normalization and the base
/// dispatch.
///
/// # Errors
///
/// Returns whatever the driver reports for a failed bind.
pub fn bind_value<S: DriverStatement>(
    stmt: &mut S,
    dialect: BindDialect,
    name: &str,
    value: &Value,
) -> Result<(), SqlAccessError> {
    let normalized = dialect.normalize(value.clone());
    let (wire, tag) = to_wire(&normalized);
    stmt.bind(name, &wire, tag)
}

/// Bind every entry of a parameter map in insertion order.
///
/// # Errors
///
/// Returns the first bind error encountered.
pub fn bind_all<S: DriverStatement>(
    stmt: &mut S,
    dialect: BindDialect,
    params: &Params,
) -> Result<(), SqlAccessError> {
    for (name, value) in params {
        bind_value(stmt, dialect, name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    #[test]
    fn base_dispatch_tags() {
        assert_eq!(to_wire(&Value::Int(7)), (Value::Int(7), ParamType::Int));
        assert_eq!(
            to_wire(&Value::Float(1.5)),
            (Value::Float(1.5), ParamType::Str)
        );
        assert_eq!(
            to_wire(&Value::Text("x".into())),
            (Value::Text("x".into()), ParamType::Str)
        );
        assert_eq!(
            to_wire(&Value::Bool(true)),
            (Value::Bool(true), ParamType::Bool)
        );
        assert_eq!(to_wire(&Value::Null), (Value::Null, ParamType::Null));
    }

    #[test]
    fn json_serializes_to_text() {
        let (wire, tag) = to_wire(&Value::Json(json!({"x": 1})));
        assert_eq!(tag, ParamType::Str);
        assert_eq!(wire, Value::Text("{\"x\":1}".into()));
    }

    #[test]
    fn mysql_normalization() {
        let d = BindDialect::MySql;
        assert_eq!(d.normalize(Value::Bool(true)), Value::Int(1));
        assert_eq!(d.normalize(Value::Bool(false)), Value::Int(0));
        assert_eq!(d.normalize(Value::Text(String::new())), Value::Null);
        assert_eq!(d.normalize(Value::Text("  \t".into())), Value::Null);
        assert_eq!(
            d.normalize(Value::Text("kept".into())),
            Value::Text("kept".into())
        );
        assert_eq!(
            d.normalize(Value::Timestamp(ts())),
            Value::Text("2024-03-09 14:30:05".into())
        );
    }

    #[test]
    fn generic_dialect_is_identity() {
        let d = BindDialect::Generic;
        assert_eq!(d.normalize(Value::Bool(true)), Value::Bool(true));
        assert_eq!(
            d.normalize(Value::Text(String::new())),
            Value::Text(String::new())
        );
    }

    #[test]
    fn dialect_from_scheme() {
        assert_eq!(BindDialect::for_scheme("mysql"), BindDialect::MySql);
        assert_eq!(BindDialect::for_scheme("MySQL"), BindDialect::MySql);
        assert_eq!(BindDialect::for_scheme("sqlite"), BindDialect::Generic);
    }
}
