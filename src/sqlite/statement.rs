use rusqlite::Statement;

use crate::driver::DriverStatement;
use crate::error::SqlAccessError;
use crate::results::ResultSet;
use crate::types::{ParamType, Value};

use super::params::{to_sqlite_value, value_from_sqlite};

/// A prepared SQLite statement.
///
/// Rows are materialized eagerly during [`execute`](DriverStatement::execute)
/// so the handle can outlive rusqlite's row cursor borrow.
pub struct SqliteStatement<'conn> {
    stmt: Statement<'conn>,
    buffered: Option<ResultSet>,
    affected: u64,
}

impl<'conn> SqliteStatement<'conn> {
    pub(crate) fn new(stmt: Statement<'conn>) -> Self {
        Self {
            stmt,
            buffered: None,
            affected: 0,
        }
    }
}

impl DriverStatement for SqliteStatement<'_> {
    fn bind(&mut self, name: &str, value: &Value, _tag: ParamType) -> Result<(), SqlAccessError> {
        let placeholder = format!(":{name}");
        let index = self.stmt.parameter_index(&placeholder)?.ok_or_else(|| {
            SqlAccessError::ParameterError(format!("no placeholder {placeholder} in statement"))
        })?;
        self.stmt.raw_bind_parameter(index, to_sqlite_value(value))?;
        Ok(())
    }

    fn execute(&mut self) -> Result<u64, SqlAccessError> {
        if self.stmt.column_count() == 0 {
            let changed = self.stmt.raw_execute()?;
            self.affected = changed as u64;
            self.buffered = None;
            return Ok(self.affected);
        }

        let column_names: Vec<String> = self
            .stmt
            .column_names()
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut set = ResultSet::with_capacity(10);
        set.set_column_names(column_names);

        let column_count = self.stmt.column_count();
        let mut rows = self.stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(value_from_sqlite(row.get(i)?)?);
            }
            set.add_row_values(values);
        }
        drop(rows);

        set.rows_affected = set.len() as u64;
        self.affected = set.rows_affected;
        self.buffered = Some(set);
        Ok(self.affected)
    }

    fn fetch_all(&mut self) -> Result<ResultSet, SqlAccessError> {
        Ok(self.buffered.take().unwrap_or_default())
    }

    fn next_result_set(&mut self) -> Result<bool, SqlAccessError> {
        Ok(false)
    }

    fn rows_affected(&self) -> u64 {
        self.affected
    }
}
