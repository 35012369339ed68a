//! Canonical application schema: idempotent setup and explicit reset.
//!
//! The application schema is the `messages` table plus its indexes, created
//! from a single definition so setup and reset cannot drift apart. Setup is
//! idempotent; reset is destructive and only ever invoked explicitly.
//! Both verify the table's existence afterwards against the database's own
//! catalog, and a failed verification is reported as the distinct
//! [`MigrateError::Unverified`] outcome rather than silent success.

use rusqlite::types::Value;
use tracing::{info, warn};

use sqlward_client::Db;

use crate::error::{MigrateError, Result};

/// The application table managed by setup/reset.
pub const MESSAGES_TABLE: &str = "messages";

/// CREATE statements for the application schema. `IF NOT EXISTS` keeps the
/// batch safe to re-run.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    subject TEXT,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_messages_email ON messages(email);
CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
"#;

/// DROP statements, tolerant of absent tables.
const DROP_SQL: &str = "DROP TABLE IF EXISTS messages;";

/// Outcome of an idempotent setup call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The schema was created by this call.
    Created,
    /// The schema was already present; nothing ran.
    AlreadyExists,
}

/// Checks the database catalog for a table by name.
///
/// Returns `false` for "not found"; errors only on connectivity or query
/// failure.
pub fn table_exists(db: &Db, table: &str) -> Result<bool> {
    let rows = db.query(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        &[Value::from(table.to_string())],
    )?;
    Ok(matches!(rows.first().and_then(|r| r.first()), Some(Value::Integer(n)) if *n > 0))
}

/// Whether the application schema is present.
pub fn schema_exists(db: &Db) -> Result<bool> {
    table_exists(db, MESSAGES_TABLE)
}

/// Ensures the application schema exists.
///
/// No-op when the table is already present. Otherwise runs the canonical
/// CREATE batch in one transaction and re-verifies existence.
///
/// # Errors
///
/// [`MigrateError::Unverified`] if the batch executed but the table still
/// does not appear in the catalog — a driver or replication problem that
/// needs operator attention.
pub fn setup_schema(db: &Db) -> Result<SetupOutcome> {
    if schema_exists(db)? {
        info!(table = MESSAGES_TABLE, "schema already present, nothing to do");
        return Ok(SetupOutcome::AlreadyExists);
    }

    db.transaction(|tx| tx.execute_batch(SCHEMA_SQL))?;

    if !schema_exists(db)? {
        warn!(table = MESSAGES_TABLE, "schema creation did not verify");
        return Err(MigrateError::Unverified(MESSAGES_TABLE.to_string()));
    }
    info!(table = MESSAGES_TABLE, "schema created");
    Ok(SetupOutcome::Created)
}

/// Drops and recreates the application schema. Destructive; callers must
/// make the distinction from [`setup_schema`] explicit at the call site.
pub fn reset_schema(db: &Db) -> Result<()> {
    warn!(table = MESSAGES_TABLE, "dropping application schema");
    db.transaction(|tx| tx.execute_batch(DROP_SQL))?;
    setup_schema(db)?;
    Ok(())
}
