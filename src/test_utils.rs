//! Scripted in-memory driver for exercising the access layer without a
//! database.
//!
//! The mock records every physical connect, executed statement, and bound
//! parameter, and replays scripted result sets, so tests can assert on the
//! exact wire-level behavior of the layer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::driver::{Driver, DriverConnection, DriverStatement};
use crate::dsn::ConnectOptions;
use crate::error::SqlAccessError;
use crate::results::ResultSet;
use crate::types::{ParamType, Value};

/// One recorded bind call.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    pub name: String,
    pub value: Value,
    pub tag: ParamType,
}

/// One recorded statement execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub binds: Vec<Bind>,
}

/// Scripted outcome for the next executed statement.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResult {
    /// Result sets in driver order; `next_result_set` advances through them.
    pub result_sets: Vec<ResultSet>,
    pub rows_affected: u64,
}

#[derive(Default)]
struct MockState {
    connects: usize,
    fail_next_connect: bool,
    executed: Vec<ExecutedStatement>,
    scripts: VecDeque<Result<ScriptedResult, String>>,
    last_insert_id: Option<i64>,
    last_connect_options: Option<ConnectOptions>,
}

/// Driver whose connections record everything and replay scripts.
#[derive(Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

/// Inspection and scripting handle, shared with the driver.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle over the same recorded state, usable after the driver has been
    /// moved into a client.
    #[must_use]
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock(state: &Arc<Mutex<MockState>>) -> MutexGuard<'_, MockState> {
    state.lock().expect("mock driver state poisoned")
}

impl MockHandle {
    #[must_use]
    pub fn connects(&self) -> usize {
        lock(&self.state).connects
    }

    #[must_use]
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        lock(&self.state).executed.clone()
    }

    #[must_use]
    pub fn last_connect_options(&self) -> Option<ConnectOptions> {
        lock(&self.state).last_connect_options.clone()
    }

    /// Script the outcome of the next executed statement.
    pub fn push_script(&self, script: ScriptedResult) {
        lock(&self.state).scripts.push_back(Ok(script));
    }

    /// Make the next executed statement fail with an execution error.
    pub fn push_error(&self, message: &str) {
        lock(&self.state).scripts.push_back(Err(message.to_string()));
    }

    /// Script a single result set for the next statement.
    pub fn push_rows(&self, set: ResultSet) {
        let rows_affected = set.len() as u64;
        self.push_script(ScriptedResult {
            result_sets: vec![set],
            rows_affected,
        });
    }

    /// Script only an affected-row count for the next statement.
    pub fn push_affected(&self, rows_affected: u64) {
        self.push_script(ScriptedResult {
            result_sets: Vec::new(),
            rows_affected,
        });
    }

    pub fn set_last_insert_id(&self, id: i64) {
        lock(&self.state).last_insert_id = Some(id);
    }

    /// Make the next physical connect fail with a connection error.
    pub fn fail_next_connect(&self) {
        lock(&self.state).fail_next_connect = true;
    }
}

impl Driver for MockDriver {
    type Conn = MockConnection;

    fn connect(&mut self, opts: &ConnectOptions) -> Result<Self::Conn, SqlAccessError> {
        let mut state = lock(&self.state);
        if state.fail_next_connect {
            state.fail_next_connect = false;
            return Err(SqlAccessError::ConnectionError(
                "scripted connection failure".into(),
            ));
        }
        state.connects += 1;
        state.last_connect_options = Some(opts.clone());
        Ok(MockConnection {
            state: Arc::clone(&self.state),
        })
    }
}

/// Recorded mock connection.
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl DriverConnection for MockConnection {
    type Statement<'conn>
        = MockStatement
    where
        Self: 'conn;

    fn prepare(&mut self, sql: &str) -> Result<Self::Statement<'_>, SqlAccessError> {
        Ok(MockStatement {
            state: Arc::clone(&self.state),
            sql: sql.to_string(),
            binds: Vec::new(),
            sets: Vec::new(),
            cursor: 0,
            affected: 0,
        })
    }

    fn exec_raw(&mut self, sql: &str) -> Result<u64, SqlAccessError> {
        let mut state = lock(&self.state);
        state.executed.push(ExecutedStatement {
            sql: sql.to_string(),
            binds: Vec::new(),
        });
        let script = match state.scripts.pop_front() {
            Some(Err(message)) => return Err(SqlAccessError::ExecutionError(message)),
            Some(Ok(script)) => script,
            None => ScriptedResult::default(),
        };
        Ok(script.rows_affected)
    }

    fn last_insert_id(&mut self, _sequence: Option<&str>) -> Result<Option<i64>, SqlAccessError> {
        Ok(lock(&self.state).last_insert_id)
    }
}

/// Recorded mock statement replaying its script.
pub struct MockStatement {
    state: Arc<Mutex<MockState>>,
    sql: String,
    binds: Vec<Bind>,
    sets: Vec<ResultSet>,
    cursor: usize,
    affected: u64,
}

impl DriverStatement for MockStatement {
    fn bind(&mut self, name: &str, value: &Value, tag: ParamType) -> Result<(), SqlAccessError> {
        let bind = Bind {
            name: name.to_string(),
            value: value.clone(),
            tag,
        };
        // Rebinding a name overwrites, as drivers do when a prepared
        // statement is executed repeatedly.
        match self.binds.iter_mut().find(|b| b.name == name) {
            Some(existing) => *existing = bind,
            None => self.binds.push(bind),
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<u64, SqlAccessError> {
        let mut state = lock(&self.state);
        state.executed.push(ExecutedStatement {
            sql: self.sql.clone(),
            binds: self.binds.clone(),
        });
        let script = match state.scripts.pop_front() {
            Some(Err(message)) => return Err(SqlAccessError::ExecutionError(message)),
            Some(Ok(script)) => script,
            None => ScriptedResult::default(),
        };
        drop(state);
        self.sets = script.result_sets;
        self.cursor = 0;
        self.affected = script.rows_affected;
        Ok(self.affected)
    }

    fn fetch_all(&mut self) -> Result<ResultSet, SqlAccessError> {
        Ok(self.sets.get(self.cursor).cloned().unwrap_or_default())
    }

    fn next_result_set(&mut self) -> Result<bool, SqlAccessError> {
        if self.cursor + 1 < self.sets.len() {
            self.cursor += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn rows_affected(&self) -> u64 {
        self.affected
    }
}

/// Build a result set from column names and row values.
#[must_use]
pub fn result_set(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
    let mut set = ResultSet::with_capacity(rows.len());
    set.set_column_names(columns.iter().map(ToString::to_string).collect());
    for values in rows {
        set.add_row_values(values);
    }
    set.rows_affected = set.len() as u64;
    set
}
