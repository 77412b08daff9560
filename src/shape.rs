//! Result-shape normalization.
//!
//! Raw result sets are reshaped into scalars, single rows, keyed or grouped
//! maps, or flat columns. JSON post-processing is cosmetic: a flagged column
//! that fails to decode is left as raw text with a warning rather than
//! failing the query.

use indexmap::IndexMap;
use tracing::warn;

use crate::client::DbClient;
use crate::driver::{Driver, DriverStatement};
use crate::error::SqlAccessError;
use crate::results::{ResultSet, Row};
use crate::types::{Params, Value};

/// JSON decoding directive attached to a query.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonFlag {
    /// No decoding.
    #[default]
    Off,
    /// Decode the scalar, or every element of a column. Ignored for row
    /// shapes, which name their columns explicitly.
    Decode,
    /// Decode the named columns of each row. Ignored for scalar/column
    /// shapes.
    Columns(Vec<String>),
}

/// Post-processing directives for the shaped result.
#[derive(Debug, Clone, Default)]
pub struct ShapeFlags {
    pub json: JsonFlag,
}

impl ShapeFlags {
    /// Decode the scalar / every column element as JSON.
    #[must_use]
    pub fn json_decode() -> Self {
        Self {
            json: JsonFlag::Decode,
        }
    }

    /// Decode the named columns of each row as JSON.
    #[must_use]
    pub fn json_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            json: JsonFlag::Columns(columns.into_iter().map(Into::into).collect()),
        }
    }
}

/// Render a value as a map key for indexed and grouped shapes.
#[must_use]
pub fn key_string(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Timestamp(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Value::Null => String::new(),
        Value::Json(json) => json.to_string(),
    }
}

/// First column of the first row, if any.
#[must_use]
pub fn scalar(set: &ResultSet) -> Option<Value> {
    set.rows.first().and_then(|row| row.get_by_index(0)).cloned()
}

/// First row, if any.
#[must_use]
pub fn one(set: ResultSet) -> Option<Row> {
    set.rows.into_iter().next()
}

/// Every row keyed by `key_column`; duplicate keys overwrite (last wins).
///
/// # Errors
///
/// Returns `SqlAccessError::ShapeError` if a row lacks the key column.
pub fn all_indexed(
    set: ResultSet,
    key_column: &str,
) -> Result<IndexMap<String, Row>, SqlAccessError> {
    let mut indexed = IndexMap::with_capacity(set.rows.len());
    for row in set.rows {
        let key = row.get(key_column).map(key_string).ok_or_else(|| {
            SqlAccessError::ShapeError(format!("key column '{key_column}' missing from row"))
        })?;
        indexed.insert(key, row);
    }
    Ok(indexed)
}

/// Every row appended under its `key_column` value; collisions group.
///
/// # Errors
///
/// Returns `SqlAccessError::ShapeError` if a row lacks the key column.
pub fn all_grouped(
    set: ResultSet,
    key_column: &str,
) -> Result<IndexMap<String, Vec<Row>>, SqlAccessError> {
    let mut grouped: IndexMap<String, Vec<Row>> = IndexMap::new();
    for row in set.rows {
        let key = row.get(key_column).map(key_string).ok_or_else(|| {
            SqlAccessError::ShapeError(format!("key column '{key_column}' missing from row"))
        })?;
        grouped.entry(key).or_default().push(row);
    }
    Ok(grouped)
}

/// Flat first-column values across all rows.
#[must_use]
pub fn column(set: ResultSet) -> Vec<Value> {
    set.rows
        .into_iter()
        .filter_map(|row| row.values.into_iter().next())
        .collect()
}

/// First column to second column key-value pairs.
///
/// # Errors
///
/// Returns `SqlAccessError::ShapeError` unless every row has exactly two
/// columns.
pub fn column_indexed(set: ResultSet) -> Result<IndexMap<String, Value>, SqlAccessError> {
    let mut pairs = IndexMap::with_capacity(set.rows.len());
    for row in set.rows {
        let mut values = row.values.into_iter();
        match (values.next(), values.next(), values.next()) {
            (Some(key), Some(value), None) => {
                pairs.insert(key_string(&key), value);
            }
            _ => {
                return Err(SqlAccessError::ShapeError(
                    "column_indexed needs exactly two columns per row".into(),
                ));
            }
        }
    }
    Ok(pairs)
}

// Tolerated failure: the raw text stays in place.
fn decode_in_place(value: &mut Value) {
    if let Value::Text(text) = value {
        match serde_json::from_str(text) {
            Ok(json) => *value = Value::Json(json),
            Err(err) => warn!(%err, "JSON decode failed on flagged column, keeping raw text"),
        }
    }
}

/// Apply the JSON flag to a scalar result.
pub fn apply_json_scalar(value: &mut Option<Value>, flag: &JsonFlag) {
    if let (JsonFlag::Decode, Some(value)) = (flag, value.as_mut()) {
        decode_in_place(value);
    }
}

/// Apply the JSON flag to a flat column result.
pub fn apply_json_column(values: &mut [Value], flag: &JsonFlag) {
    if matches!(flag, JsonFlag::Decode) {
        for value in values {
            decode_in_place(value);
        }
    }
}

/// Apply the JSON flag to row-shaped results: each named column of each row
/// is decoded in place when present and non-null.
pub fn apply_json_rows<'a>(rows: impl Iterator<Item = &'a mut Row>, flag: &JsonFlag) {
    let JsonFlag::Columns(columns) = flag else {
        return;
    };
    for row in rows {
        for column in columns {
            if let Some(value) = row.get_mut(column) {
                if !value.is_null() {
                    decode_in_place(value);
                }
            }
        }
    }
}

impl<D: Driver> DbClient<D> {
    fn fetch(&mut self, sql: &str, params: &Params) -> Result<ResultSet, SqlAccessError> {
        let mut stmt = self.query(sql, params)?;
        stmt.fetch_all()
    }

    /// First column of the first row, or `None` on an empty result.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn query_scalar(
        &mut self,
        sql: &str,
        params: &Params,
        flags: &ShapeFlags,
    ) -> Result<Option<Value>, SqlAccessError> {
        let set = self.fetch(sql, params)?;
        let mut value = scalar(&set);
        apply_json_scalar(&mut value, &flags.json);
        Ok(value)
    }

    /// First row as a record, or `None` on an empty result.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn query_one(
        &mut self,
        sql: &str,
        params: &Params,
        flags: &ShapeFlags,
    ) -> Result<Option<Row>, SqlAccessError> {
        let set = self.fetch(sql, params)?;
        let mut row = one(set);
        apply_json_rows(row.iter_mut(), &flags.json);
        Ok(row)
    }

    /// Every row as a sequence of records.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn query_all(
        &mut self,
        sql: &str,
        params: &Params,
        flags: &ShapeFlags,
    ) -> Result<Vec<Row>, SqlAccessError> {
        let set = self.fetch(sql, params)?;
        let mut rows = set.rows;
        apply_json_rows(rows.iter_mut(), &flags.json);
        Ok(rows)
    }

    /// Every row keyed by `key_column`; duplicate keys overwrite (last wins).
    ///
    /// # Errors
    ///
    /// Returns driver errors, or `ShapeError` if the key column is missing.
    pub fn query_all_indexed(
        &mut self,
        sql: &str,
        params: &Params,
        key_column: &str,
        flags: &ShapeFlags,
    ) -> Result<IndexMap<String, Row>, SqlAccessError> {
        let mut set = self.fetch(sql, params)?;
        apply_json_rows(set.rows.iter_mut(), &flags.json);
        all_indexed(set, key_column)
    }

    /// Every row appended into a group under its `key_column` value.
    ///
    /// # Errors
    ///
    /// Returns driver errors, or `ShapeError` if the key column is missing.
    pub fn query_all_grouped(
        &mut self,
        sql: &str,
        params: &Params,
        key_column: &str,
    ) -> Result<IndexMap<String, Vec<Row>>, SqlAccessError> {
        let set = self.fetch(sql, params)?;
        all_grouped(set, key_column)
    }

    /// Flat first-column values across all rows.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn query_column(
        &mut self,
        sql: &str,
        params: &Params,
        flags: &ShapeFlags,
    ) -> Result<Vec<Value>, SqlAccessError> {
        let set = self.fetch(sql, params)?;
        let mut values = column(set);
        apply_json_column(&mut values, &flags.json);
        Ok(values)
    }

    /// First column to second column key-value pairs across all rows.
    ///
    /// # Errors
    ///
    /// Returns driver errors, or `ShapeError` unless every row has exactly
    /// two columns.
    pub fn query_column_indexed(
        &mut self,
        sql: &str,
        params: &Params,
        flags: &ShapeFlags,
    ) -> Result<IndexMap<String, Value>, SqlAccessError> {
        let set = self.fetch(sql, params)?;
        let mut pairs = column_indexed(set)?;
        if matches!(flags.json, JsonFlag::Decode) {
            for value in pairs.values_mut() {
                decode_in_place(value);
            }
        }
        Ok(pairs)
    }
}
