use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::debug;

use crate::binder::bind_all;
use crate::driver::{Driver, DriverConnection, DriverStatement};
use crate::dsn::parse_dsn;
use crate::error::SqlAccessError;
use crate::results::ResultSet;
use crate::types::{BindDialect, Params};

/// Statement handle type produced by a client's driver.
pub type Statement<'a, D> = <<D as Driver>::Conn as DriverConnection>::Statement<'a>;

/// Hook invoked once per physical (re)connect with the fresh connection,
/// typically to run session-setup SQL.
pub type OnConnect<D> =
    Box<dyn FnMut(&mut <D as Driver>::Conn) -> Result<(), SqlAccessError> + Send>;

/// A lazily-connected client over one driver connection.
///
/// The client owns at most one live connection at a time and replaces it
/// (never mutates it) on reconnect. It is meant for one logical execution
/// context; there is no internal locking or pooling. Callers needing
/// concurrent access run one client per context.
///
/// ```rust,no_run
/// use sql_access::prelude::*;
/// use sql_access::sqlite::SqliteDriver;
///
/// # fn demo() -> Result<(), SqlAccessError> {
/// let mut db = DbClient::new(SqliteDriver, "sqlite://localhost/app.db")
///     .with_reconnect_interval(300)
///     .on_connect(|conn| conn.exec_raw("PRAGMA foreign_keys = ON").map(|_| ()));
/// let rows = db.query_all("SELECT id, name FROM users", &Params::new(), &ShapeFlags::default())?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
pub struct DbClient<D: Driver> {
    driver: D,
    dsn: String,
    options: IndexMap<String, String>,
    dialect: BindDialect,
    reconnect_interval: Option<Duration>,
    connected_at: Option<Instant>,
    on_connect: Option<OnConnect<D>>,
    conn: Option<D::Conn>,
}

impl<D: Driver> DbClient<D> {
    /// Create a client for the given driver and DSN. The binder dialect is
    /// inferred from the DSN scheme (`mysql` selects MySQL normalization).
    pub fn new(driver: D, dsn: impl Into<String>) -> Self {
        let dsn = dsn.into();
        let dialect = dsn
            .split_once("://")
            .map(|(scheme, _)| BindDialect::for_scheme(scheme))
            .unwrap_or_default();
        Self {
            driver,
            dsn,
            options: IndexMap::new(),
            dialect,
            reconnect_interval: None,
            connected_at: None,
            on_connect: None,
            conn: None,
        }
    }

    /// Caller-supplied driver options; these override DSN query-string
    /// options on key collision.
    #[must_use]
    pub fn with_options(mut self, options: IndexMap<String, String>) -> Self {
        self.options = options;
        self
    }

    /// Override the inferred binder dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: BindDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Reconnect interval in seconds; 0 disables timeout-based reconnects.
    #[must_use]
    pub fn with_reconnect_interval(mut self, seconds: u64) -> Self {
        self.reconnect_interval = (seconds > 0).then(|| Duration::from_secs(seconds));
        self
    }

    /// Register the on-connect hook. Invoked once per physical connection,
    /// never on cache hits.
    #[must_use]
    pub fn on_connect<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut D::Conn) -> Result<(), SqlAccessError> + Send + 'static,
    {
        self.on_connect = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn dialect(&self) -> BindDialect {
        self.dialect
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Get the live connection, creating it lazily.
    ///
    /// A live handle older than the reconnect interval is discarded first,
    /// so the next step recreates it. The DSN is parsed once per physical
    /// attempt; driver errors propagate unmodified.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ConfigError` for a malformed DSN, or the
    /// driver's connection error.
    pub fn connect(&mut self) -> Result<&mut D::Conn, SqlAccessError> {
        if let (Some(interval), Some(at)) = (self.reconnect_interval, self.connected_at) {
            if self.conn.is_some() && at.elapsed() >= interval {
                debug!(elapsed = ?at.elapsed(), "reconnect interval elapsed, discarding connection");
                self.conn = None;
            }
        }

        if self.conn.is_none() {
            let mut opts = parse_dsn(&self.dsn)?;
            for (key, value) in &self.options {
                opts.options.insert(key.clone(), value.clone());
            }
            let conn = self.driver.connect(&opts)?;
            self.conn = Some(conn);
            self.connected_at = Some(Instant::now());
            debug!(driver = %opts.driver, host = %opts.host, port = opts.port,
                "established physical connection");
            if let (Some(hook), Some(conn)) = (self.on_connect.as_mut(), self.conn.as_mut()) {
                hook(conn)?;
            }
        }

        self.conn
            .as_mut()
            .ok_or_else(|| SqlAccessError::ConnectionError("no live connection".into()))
    }

    /// Drop the live connection eagerly; the next [`connect`](Self::connect)
    /// recreates it regardless of the reconnect interval.
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Identifier generated by the most recent insert on the live connection.
    ///
    /// # Errors
    ///
    /// Returns `SqlAccessError::ConnectionError` if no connection is live.
    pub fn last_insert_id(&mut self, sequence: Option<&str>) -> Result<Option<i64>, SqlAccessError> {
        self.conn
            .as_mut()
            .ok_or_else(|| {
                SqlAccessError::ConnectionError("last_insert_id requires a live connection".into())
            })?
            .last_insert_id(sequence)
    }

    /// Prepare, bind, and execute `sql`, returning the statement handle for
    /// the caller's fetch calls.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn query(&mut self, sql: &str, params: &Params) -> Result<Statement<'_, D>, SqlAccessError> {
        let dialect = self.dialect;
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        if !params.is_empty() {
            bind_all(&mut stmt, dialect, params)?;
        }
        stmt.execute()?;
        Ok(stmt)
    }

    /// Execute a statement and return the affected-row count. With no
    /// parameters the SQL runs on the driver's non-prepared path.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn execute(&mut self, sql: &str, params: &Params) -> Result<u64, SqlAccessError> {
        if params.is_empty() {
            return self.connect()?.exec_raw(sql);
        }
        let stmt = self.query(sql, params)?;
        Ok(stmt.rows_affected())
    }

    /// Invoke a stored procedure, collecting every result set in order.
    ///
    /// Builds `CALL name(:k1, :k2, …)` from the parameter keys, executes
    /// once, and fetches until the driver reports no further result sets.
    /// Empty result sets appear as `None`.
    ///
    /// # Errors
    ///
    /// Returns connection, parameter, or execution errors from the driver.
    pub fn execute_procedure(
        &mut self,
        name: &str,
        params: &Params,
    ) -> Result<Vec<Option<ResultSet>>, SqlAccessError> {
        let placeholders = params
            .keys()
            .map(|key| format!(":{key}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("CALL {name}({placeholders})");

        let mut stmt = self.query(&sql, params)?;
        let mut results = Vec::new();
        loop {
            let set = stmt.fetch_all()?;
            results.push(if set.is_empty() { None } else { Some(set) });
            if !stmt.next_result_set()? {
                break;
            }
        }
        Ok(results)
    }
}
