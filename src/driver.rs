//! The narrow contract this layer consumes from a SQL driver.
//!
//! Everything above (connection management, binding, batch rewriting,
//! shaping) is generic over these traits; everything below (wire protocol,
//! statement caching, quoting) belongs to the driver. Shaping variants are
//! deliberately not part of the contract: the shaper derives scalar, keyed,
//! grouped, and column views from [`DriverStatement::fetch_all`].

use crate::error::SqlAccessError;
use crate::dsn::ConnectOptions;
use crate::results::ResultSet;
use crate::types::{ParamType, Value};

/// Factory for physical connections.
pub trait Driver {
    type Conn: DriverConnection;

    /// Establish one physical connection. Errors propagate unmodified to the
    /// caller; no retry happens at this layer.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ConnectionError` (or a driver-native error)
    /// if the connection cannot be established.
    fn connect(&mut self, opts: &ConnectOptions) -> Result<Self::Conn, SqlAccessError>;
}

/// One live driver connection.
pub trait DriverConnection {
    type Statement<'conn>: DriverStatement
    where
        Self: 'conn;

    /// Prepare a statement with named placeholders (`:name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejects the SQL.
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement<'_>, SqlAccessError>;

    /// Execute SQL directly without preparing, returning the affected-row
    /// count. Performance path for static DDL/DML.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    fn exec_raw(&mut self, sql: &str) -> Result<u64, SqlAccessError>;

    /// Identifier generated by the most recent insert, if the driver tracks
    /// one. `sequence` names the sequence for drivers that need it.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot report the identifier.
    fn last_insert_id(&mut self, sequence: Option<&str>) -> Result<Option<i64>, SqlAccessError>;
}

/// A prepared (and, after [`execute`](DriverStatement::execute), executed)
/// statement handle.
pub trait DriverStatement {
    /// Bind one named parameter with its driver type tag.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ParameterError` if the placeholder does not
    /// exist or the value cannot be converted.
    fn bind(&mut self, name: &str, value: &Value, tag: ParamType) -> Result<(), SqlAccessError>;

    /// Execute the statement, returning the affected-row count.
    ///
    /// # Errors
    ///
    /// Returns an error if execution fails.
    fn execute(&mut self) -> Result<u64, SqlAccessError>;

    /// Fetch every row of the current result set.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be read.
    fn fetch_all(&mut self) -> Result<ResultSet, SqlAccessError>;

    /// Advance to the next result set, returning whether one exists. Drivers
    /// without multi-result-set support return `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error if advancing fails.
    fn next_result_set(&mut self) -> Result<bool, SqlAccessError>;

    /// Affected-row count of the most recent execution.
    fn rows_affected(&self) -> u64;
}
