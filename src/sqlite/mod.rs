//! SQLite driver adapter backed by rusqlite.
//!
//! Implements the narrow driver contract for real round trips. Statements
//! bind by name, materialize rows eagerly on execute, and report no
//! additional result sets (SQLite has none).

mod connection;
mod params;
mod statement;

pub use connection::SqliteConnection;
pub use params::{to_sqlite_value, value_from_sqlite};
pub use statement::SqliteStatement;

use rusqlite::Connection;

use crate::driver::Driver;
use crate::dsn::ConnectOptions;
use crate::error::SqlAccessError;

/// In-memory database used when the DSN names no database path.
const MEMORY_DB: &str = ":memory:";

/// Driver factory opening one SQLite database per connection.
///
/// The DSN's database segment is the file path (`sqlite://localhost//var/db/x.db`
/// opens `/var/db/x.db`); with no segment an in-memory database is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    type Conn = SqliteConnection;

    fn connect(&mut self, opts: &ConnectOptions) -> Result<Self::Conn, SqlAccessError> {
        let path = opts.database.as_deref().unwrap_or(MEMORY_DB);
        let conn = Connection::open(path)?;
        Ok(SqliteConnection::new(conn))
    }
}
