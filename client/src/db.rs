//! The database handle: lazy connection, parameterized execution, scoped
//! transactions.
//!
//! [`Db`] is the only type in the workspace permitted to hold a live
//! driver connection. Every statement goes through a parameterized entry
//! point — callers never splice untrusted values into SQL text; variable
//! parts always travel through the positional `params` slice. This is a
//! hard invariant of the whole workspace, not a style preference: the
//! validation layer in `sqlward-core` and this wrapper together form the
//! injection defense, and string-built SQL defeats both.
//!
//! The connection is established on the first operation, not at
//! construction, and the outcome is cached either way: a handle whose
//! first connection attempt failed keeps returning that failure instead of
//! silently retrying, so a persistent misconfiguration never masquerades
//! as a transient one.
//!
//! # Example
//!
//! ```no_run
//! use sqlward_client::{Db, DbConfig};
//! use rusqlite::types::Value;
//!
//! let config = DbConfig::new("file:app.db", "secret").unwrap();
//! let db = Db::new(config);
//!
//! db.execute(
//!     "INSERT INTO messages (name, email, message) VALUES (?1, ?2, ?3)",
//!     &[Value::from("Ada".to_string()),
//!       Value::from("ada@example.com".to_string()),
//!       Value::from("Hello".to_string())],
//! ).unwrap();
//! ```

use std::cell::RefCell;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::{debug, warn};

use crate::config::DbConfig;
use crate::error::{ClientError, Result};

/// Metadata returned by a non-query statement.
#[derive(Debug, Clone, Copy)]
pub struct ExecResult {
    /// Rows inserted, updated, or deleted by the statement.
    pub rows_affected: usize,
    /// Rowid of the most recent successful INSERT on this connection.
    pub last_insert_rowid: i64,
}

/// One result row, with every column read back as a dynamically typed value.
pub type Row = Vec<Value>;

enum ConnState {
    /// No connection attempt has been made yet.
    Pending,
    Ready(Connection),
    /// First attempt failed; the detail is re-raised on every later call.
    Failed(String),
}

/// A configured, lazily-connected database handle.
///
/// Constructed once per process from a validated [`DbConfig`] and passed by
/// reference into everything that needs database access. The handle is
/// single-threaded (the runner model has one writer process at a time); a
/// concurrent embedding would need its own mutual exclusion around it.
pub struct Db {
    config: DbConfig,
    state: RefCell<ConnState>,
}

impl Db {
    /// Creates a handle from a validated config. No connection is made until
    /// the first operation.
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            state: RefCell::new(ConnState::Pending),
        }
    }

    /// Executes a parameterized non-query statement.
    ///
    /// # Errors
    ///
    /// Any driver failure is returned as [`ClientError::Execution`] with a
    /// generic message; the underlying cause is logged and available via
    /// [`ClientError::detail`].
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.with_conn(|conn| {
            let rows_affected = conn
                .execute(sql, params_from_iter(params.iter()))
                .map_err(exec_err)?;
            Ok(ExecResult {
                rows_affected,
                last_insert_rowid: conn.last_insert_rowid(),
            })
        })
    }

    /// Executes a parameterized query and collects all result rows.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(exec_err)?;
            collect_rows(&mut stmt, params)
        })
    }

    /// Runs `f` inside a transaction, committing on `Ok` and rolling back
    /// on `Err`.
    ///
    /// This is the only way callers express multi-statement atomic units;
    /// the migration runner uses it to pair each script with its
    /// bookkeeping write.
    pub fn transaction<T>(&self, f: impl FnOnce(&Tx<'_>) -> Result<T>) -> Result<T> {
        self.with_conn(|conn| {
            let tx = Tx {
                inner: conn.transaction().map_err(exec_err)?,
            };
            let out = f(&tx)?;
            tx.inner.commit().map_err(exec_err)?;
            Ok(out)
        })
    }

    /// Runs `f` against the cached connection, establishing it first if this
    /// is the initial operation.
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut state = self.state.borrow_mut();
        if let ConnState::Pending = *state {
            *state = match self.connect() {
                Ok(conn) => ConnState::Ready(conn),
                Err(detail) => {
                    warn!("database connection failed");
                    debug!(detail = %detail, url = self.config.url(), "connection failure detail");
                    ConnState::Failed(detail)
                }
            };
        }
        match &mut *state {
            ConnState::Ready(conn) => f(conn),
            ConnState::Failed(detail) => Err(ClientError::Execution {
                detail: detail.clone(),
            }),
            ConnState::Pending => unreachable!("connection state resolved above"),
        }
    }

    fn connect(&self) -> std::result::Result<Connection, String> {
        debug!(url = self.config.url(), "opening database connection");
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn =
            Connection::open_with_flags(self.config.url(), flags).map_err(|e| e.to_string())?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| e.to_string())?;
        Ok(conn)
    }
}

/// A scoped transaction sharing the parameterized execution surface of [`Db`].
pub struct Tx<'conn> {
    inner: rusqlite::Transaction<'conn>,
}

impl Tx<'_> {
    /// Executes a parameterized non-query statement inside the transaction.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.inner
            .execute(sql, params_from_iter(params.iter()))
            .map_err(exec_err)
    }

    /// Executes a multi-statement batch (no parameters) inside the
    /// transaction. Used for migration scripts, which are operator-authored
    /// SQL rather than untrusted input.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.inner.execute_batch(sql).map_err(exec_err)
    }

    /// Executes a parameterized query inside the transaction.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let mut stmt = self.inner.prepare(sql).map_err(exec_err)?;
        collect_rows(&mut stmt, params)
    }
}

fn collect_rows(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> Result<Vec<Row>> {
    let column_count = stmt.column_count();
    let mapped = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            (0..column_count).map(|i| row.get::<_, Value>(i)).collect::<std::result::Result<Row, _>>()
        })
        .map_err(exec_err)?;
    let mut rows = Vec::new();
    for row in mapped {
        rows.push(row.map_err(exec_err)?);
    }
    Ok(rows)
}

/// Normalizes a driver error: generic message outward, full detail logged.
fn exec_err(e: rusqlite::Error) -> ClientError {
    debug!(error = %e, "database operation failed");
    ClientError::Execution {
        detail: e.to_string(),
    }
}
