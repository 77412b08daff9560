use std::collections::HashMap;
use std::sync::Arc;

use crate::types::Value;

/// A row from a query result.
///
/// Column names and the name-to-index lookup are shared across all rows of
/// one result set.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across the result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<Value>,
    // Shared name->index lookup, avoids repeated string comparisons
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Get the index of a column by name.
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a mutable value by column name.
    pub fn get_mut(&mut self, column_name: &str) -> Option<&mut Value> {
        self.column_index(column_name)
            .and_then(|idx| self.values.get_mut(idx))
    }

    /// Get a value by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A materialized result set: rows plus the affected-row count for DML.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub rows: Vec<Row>,
    /// The number of rows affected (for DML statements)
    pub rows_affected: u64,
    column_names: Option<Arc<Vec<String>>>,
    column_index: Option<Arc<HashMap<String, usize>>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
            column_index: None,
        }
    }

    /// Set the column names shared by every row of this result set.
    pub fn set_column_names(&mut self, column_names: Vec<String>) {
        let index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect::<HashMap<_, _>>();
        self.column_names = Some(Arc::new(column_names));
        self.column_index = Some(Arc::new(index));
    }

    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append a row; `set_column_names` must have been called first.
    pub fn add_row_values(&mut self, values: Vec<Value>) {
        debug_assert!(
            self.column_names.is_some(),
            "add_row_values called before set_column_names"
        );
        if let (Some(names), Some(index)) = (&self.column_names, &self.column_index) {
            self.rows.push(Row {
                column_names: Arc::clone(names),
                values,
                column_index: Arc::clone(index),
            });
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(vec!["id".into(), "name".into()]);
        rs.add_row_values(vec![Value::Int(1), Value::Text("a".into())]);
        rs.add_row_values(vec![Value::Int(2), Value::Text("b".into())]);
        rs
    }

    #[test]
    fn lookup_by_name_and_index() {
        let rs = sample();
        assert_eq!(rs.len(), 2);
        let row = &rs.rows[1];
        assert_eq!(row.get("id"), Some(&Value::Int(2)));
        assert_eq!(row.get_by_index(1), Some(&Value::Text("b".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "before set_column_names")]
    fn rows_before_column_names_are_an_adapter_bug() {
        let mut rs = ResultSet::default();
        rs.add_row_values(vec![Value::Int(1)]);
    }
}
