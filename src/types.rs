use chrono::NaiveDateTime;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Values that can be bound as statement parameters or read back from a row.
///
/// A single closed enum is used for both directions so helper functions never
/// need to branch on driver types:
/// ```rust
/// use sql_access::prelude::*;
///
/// let params = params![
///     "id" => Value::Int(1),
///     "name" => Value::Text("alice".into()),
///     "active" => Value::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let Value::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let Value::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let Value::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let Value::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

/// Driver-level type tag attached to a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Bind as an integer
    Int,
    /// Bind as a string (also used for floats and serialized JSON)
    Str,
    /// Bind as a boolean
    Bool,
    /// Bind as NULL
    Null,
}

/// Named parameters for one statement execution, in insertion order.
///
/// Placeholders are named (`:name`), so ordering never affects correctness,
/// but insertion order is still preserved: procedure calls and batch rewrites
/// derive their column order from it.
pub type Params = IndexMap<String, Value>;

/// One field of a batch row: either an ordinary bound value or a raw SQL
/// fragment spliced verbatim into the value group.
///
/// `Raw` deliberately bypasses parameter binding (for expressions like
/// `NOW()`) and is only honored by the single-statement batch rewrite; any
/// other use is rejected with a parameter error.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchValue {
    /// Bound through the normal binder dispatch.
    Bind(Value),
    /// Unescaped SQL fragment, caller opt-in per field.
    Raw(String),
}

impl From<Value> for BatchValue {
    fn from(value: Value) -> Self {
        BatchValue::Bind(value)
    }
}

/// An ordered column-key to value mapping for batched INSERT/UPDATE.
pub type BatchRow = IndexMap<String, BatchValue>;

/// Binder dialect selecting value normalization before the base dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum BindDialect {
    /// No normalization; base dispatch only.
    #[default]
    Generic,
    /// MySQL normalization: booleans to 0/1, blank strings to NULL,
    /// timestamps to `YYYY-MM-DD HH:MM:SS`.
    MySql,
}

impl BindDialect {
    /// Dialect implied by a DSN scheme.
    #[must_use]
    pub fn for_scheme(scheme: &str) -> Self {
        if scheme.eq_ignore_ascii_case("mysql") {
            BindDialect::MySql
        } else {
            BindDialect::Generic
        }
    }
}

/// Build a [`Params`] map from `key => value` pairs.
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Params::new();
        $( map.insert(::std::string::String::from($key), $value); )+
        map
    }};
}

/// Build a [`BatchRow`] from `key => value` pairs; values may be [`Value`] or
/// [`BatchValue`].
#[macro_export]
macro_rules! batch_row {
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::BatchRow::new();
        $( map.insert(
            ::std::string::String::from($key),
            $crate::BatchValue::from($value),
        ); )+
        map
    }};
}
