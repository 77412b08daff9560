use rusqlite::Connection;

use crate::driver::DriverConnection;
use crate::error::SqlAccessError;

use super::statement::SqliteStatement;

/// One live SQLite connection.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrow the underlying rusqlite connection for driver-specific needs.
    #[must_use]
    pub fn raw(&self) -> &Connection {
        &self.conn
    }
}

impl DriverConnection for SqliteConnection {
    type Statement<'conn>
        = SqliteStatement<'conn>
    where
        Self: 'conn;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement<'_>, SqlAccessError> {
        let stmt = self.conn.prepare(sql)?;
        Ok(SqliteStatement::new(stmt))
    }

    fn exec_raw(&mut self, sql: &str) -> Result<u64, SqlAccessError> {
        // execute_batch accepts multi-statement SQL, which the non-prepared
        // path is typically used for (schema setup, session pragmas).
        self.conn.execute_batch(sql)?;
        Ok(self.conn.changes())
    }

    fn last_insert_id(&mut self, _sequence: Option<&str>) -> Result<Option<i64>, SqlAccessError> {
        Ok(Some(self.conn.last_insert_rowid()))
    }
}
