//! Batched multi-row writes.
//!
//! The single-statement rewrite turns one templated INSERT/UPDATE containing
//! the `:VALUES` marker into a statement with N parenthesized value groups
//! and per-row deconflicted parameter names, executed once. The per-row loop
//! is the driver-agnostic fallback: prepare once, bind and execute per row.

use tracing::debug;

use crate::binder::bind_all;
use crate::client::DbClient;
use crate::driver::{Driver, DriverConnection, DriverStatement};
use crate::error::SqlAccessError;
use crate::types::{BatchRow, BatchValue, Params};

/// Marker token substituted by the value-group list.
pub const VALUES_MARKER: &str = ":VALUES";

/// Render the comma-joined value groups and the combined parameter mapping
/// for a batch.
///
/// Row `i`, column `k` binds under the deconflicted name `k_i`; raw fragments
/// are spliced verbatim. Every row must use the first row's key set, in the
/// same order.
///
/// # Errors
///
/// Returns `SqlAccessError::ParameterError` if a row's key set differs from
/// the first row's.
pub fn render_value_groups(rows: &[BatchRow]) -> Result<(String, Params), SqlAccessError> {
    let mut params = Params::new();
    let mut groups = Vec::with_capacity(rows.len());

    let first_keys: Vec<&String> = rows.first().map(|row| row.keys().collect()).unwrap_or_default();

    for (index, row) in rows.iter().enumerate() {
        if row.len() != first_keys.len()
            || !row.keys().zip(first_keys.iter()).all(|(a, b)| a == *b)
        {
            return Err(SqlAccessError::ParameterError(format!(
                "batch row {index} does not match the first row's column keys"
            )));
        }

        let mut fields = Vec::with_capacity(row.len());
        for (key, field) in row {
            match field {
                BatchValue::Bind(value) => {
                    let name = format!("{key}_{index}");
                    fields.push(format!(":{name}"));
                    params.insert(name, value.clone());
                }
                BatchValue::Raw(fragment) => fields.push(fragment.clone()),
            }
        }
        groups.push(format!("({})", fields.join(",")));
    }

    Ok((groups.join(","), params))
}

fn row_params(row: &BatchRow) -> Result<Params, SqlAccessError> {
    let mut params = Params::new();
    for (key, field) in row {
        match field {
            BatchValue::Bind(value) => {
                params.insert(key.clone(), value.clone());
            }
            BatchValue::Raw(_) => {
                return Err(SqlAccessError::ParameterError(format!(
                    "raw SQL fragment for '{key}' is only valid in the batched rewrite"
                )));
            }
        }
    }
    Ok(params)
}

impl<D: Driver> DbClient<D> {
    /// Execute a templated multi-row write as one statement.
    ///
    /// No-op returning 0 on an empty batch. A failure aborts the whole
    /// statement; partial application is impossible since only one statement
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ConfigError` if the template lacks the
    /// `:VALUES` marker, `ParameterError` for mismatched row key sets, or the
    /// driver's execution error.
    pub fn execute_multiple(
        &mut self,
        sql: &str,
        rows: &[BatchRow],
    ) -> Result<u64, SqlAccessError> {
        if rows.is_empty() {
            return Ok(0);
        }
        if !sql.contains(VALUES_MARKER) {
            return Err(SqlAccessError::ConfigError(format!(
                "batch template has no {VALUES_MARKER} marker: {sql}"
            )));
        }

        let (groups, params) = render_value_groups(rows)?;
        let rewritten = sql.replacen(VALUES_MARKER, &groups, 1);
        debug!(rows = rows.len(), params = params.len(), "rewrote batch statement");
        self.execute(&rewritten, &params)
    }

    /// Alias of [`execute_multiple`](Self::execute_multiple) for readability
    /// at INSERT call sites.
    ///
    /// # Errors
    ///
    /// See [`execute_multiple`](Self::execute_multiple).
    pub fn insert_multiple(&mut self, sql: &str, rows: &[BatchRow]) -> Result<u64, SqlAccessError> {
        self.execute_multiple(sql, rows)
    }

    /// Alias of [`execute_multiple`](Self::execute_multiple) for readability
    /// at UPDATE call sites.
    ///
    /// # Errors
    ///
    /// See [`execute_multiple`](Self::execute_multiple).
    pub fn update_multiple(&mut self, sql: &str, rows: &[BatchRow]) -> Result<u64, SqlAccessError> {
        self.execute_multiple(sql, rows)
    }

    /// Execute a statement once per row, summing affected-row counts.
    ///
    /// The statement is prepared once and re-bound per row. Not atomic: a
    /// mid-batch failure leaves earlier rows applied.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ParameterError` if a row contains a raw
    /// fragment, or the driver's error for the failing row.
    pub fn execute_each(&mut self, sql: &str, rows: &[BatchRow]) -> Result<u64, SqlAccessError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let dialect = self.dialect();
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let mut affected = 0;
        for row in rows {
            let params = row_params(row)?;
            bind_all(&mut stmt, dialect, &params)?;
            affected += stmt.execute()?;
        }
        Ok(affected)
    }
}
