//! The migration runner: ordered, transactional schema evolution.
//!
//! Each migration moves between two runtime states: pending and applied.
//! There is no persisted "failed" state — a migration either fully applies
//! (script plus bookkeeping row, in one transaction) or the transaction
//! rolls back and it stays pending. SQLite rolls DDL back with the
//! transaction, so the pairing holds for schema changes too; the
//! bookkeeping table can never disagree with the schema it describes.
//!
//! Within one [`up`](Runner::up) invocation, migrations apply in strictly
//! increasing name order; processing stops at the first failure, leaving
//! earlier migrations committed and later ones pending. There is no
//! cross-migration rollback. [`down`](Runner::down) reverts only the single
//! most-recently-applied migration per invocation, located by bookkeeping
//! insertion order rather than filename order (the two coincide unless the
//! bookkeeping table was edited by hand).
//!
//! Rolling back a migration with no `.down.sql` file logs a warning and
//! deletes the bookkeeping row anyway — forward-only migrations are an
//! accepted policy here, at the cost of treating "no inverse ran" the same
//! as "successfully reverted". A stricter deployment can refuse by checking
//! [`StatusEntry::has_down`] before invoking rollback.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use serde::Serialize;
use tracing::{info, warn};

use sqlward_client::Db;

use crate::error::{MigrateError, Result};
use crate::files::{self, MigrationFile};

/// The bookkeeping table recording which migrations have been applied.
pub const MIGRATIONS_TABLE: &str = "_migrations";

const ENSURE_BOOKKEEPING_SQL: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// Runs migrations from a directory against a database handle.
pub struct Runner<'a> {
    db: &'a Db,
    dir: PathBuf,
}

/// Result of a successful [`Runner::up`] invocation.
#[derive(Debug, Clone, Serialize)]
pub struct UpReport {
    /// Names applied by this run, in application order.
    pub applied: Vec<String>,
    /// Discovered migrations that were already applied before this run.
    pub skipped: usize,
}

/// Outcome of a [`Runner::down`] invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DownOutcome {
    /// The most recent migration was reverted.
    RolledBack {
        /// The reverted migration's name.
        name: String,
        /// Whether an inverse script actually ran, or the rollback was a
        /// bookkeeping-only no-op for a forward-only migration.
        script_ran: bool,
    },
    /// The bookkeeping table was empty.
    NothingToRollBack,
}

/// Applied/pending state of one discovered migration.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    /// Migration name stem.
    pub name: String,
    /// Whether a bookkeeping row exists for it.
    pub applied: bool,
    /// Whether an inverse script exists on disk.
    pub has_down: bool,
}

/// Full status report: every discovered migration plus aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Per-migration state in application order.
    pub entries: Vec<StatusEntry>,
    /// Applied bookkeeping records with no corresponding file on disk —
    /// an invariant violation worth surfacing, not an error.
    pub orphaned_records: Vec<String>,
    /// Count of applied entries.
    pub applied_count: usize,
    /// Count of pending entries.
    pub pending_count: usize,
}

impl<'a> Runner<'a> {
    /// Creates a runner over `db` using migration files from `dir`.
    pub fn new(db: &'a Db, dir: impl Into<PathBuf>) -> Self {
        Self { db, dir: dir.into() }
    }

    /// The migrations directory this runner scans.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of applied migrations, in bookkeeping insertion order.
    pub fn applied(&self) -> Result<Vec<String>> {
        self.ensure_bookkeeping()?;
        let rows = self
            .db
            .query("SELECT name FROM _migrations ORDER BY id", &[])?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Discovered migrations not yet applied, in discovery order.
    pub fn pending(&self) -> Result<Vec<MigrationFile>> {
        let applied = self.applied()?;
        Ok(files::discover(&self.dir)?
            .into_iter()
            .filter(|m| !applied.contains(&m.name))
            .collect())
    }

    /// Applies all pending migrations in order.
    ///
    /// Each migration's script and bookkeeping insert run in one
    /// transaction. Stops at the first failure; migrations applied earlier
    /// in the run stay committed.
    pub fn up(&self) -> Result<UpReport> {
        let pending = self.pending()?;
        let skipped = files::discover(&self.dir)?.len() - pending.len();

        let mut report = UpReport {
            applied: Vec::new(),
            skipped,
        };
        for migration in pending {
            let up_sql = fs::read_to_string(&migration.up_path)?;
            info!(name = %migration.name, "applying migration");
            self.db
                .transaction(|tx| {
                    tx.execute_batch(&up_sql)?;
                    tx.execute(
                        "INSERT INTO _migrations (name) VALUES (?1)",
                        &[Value::from(migration.name.clone())],
                    )?;
                    Ok(())
                })
                .map_err(|source| MigrateError::MigrationFailed {
                    name: migration.name.clone(),
                    source,
                })?;
            report.applied.push(migration.name);
        }
        Ok(report)
    }

    /// Rolls back the single most-recently-applied migration.
    ///
    /// The inverse script and the bookkeeping delete run in one
    /// transaction. A missing `.down.sql` logs a warning and deletes the
    /// record anyway.
    pub fn down(&self) -> Result<DownOutcome> {
        self.ensure_bookkeeping()?;
        let rows = self
            .db
            .query("SELECT name FROM _migrations ORDER BY id DESC LIMIT 1", &[])?;
        let Some(Value::Text(name)) = rows.into_iter().next().and_then(|r| r.into_iter().next())
        else {
            info!("no applied migrations to roll back");
            return Ok(DownOutcome::NothingToRollBack);
        };

        let down_path = self.dir.join(format!("{name}.down.sql"));
        let down_sql = if down_path.exists() {
            Some(fs::read_to_string(&down_path)?)
        } else {
            warn!(name = %name, "no down script; removing bookkeeping record without reverting schema");
            None
        };

        info!(name = %name, script = down_sql.is_some(), "rolling back migration");
        self.db
            .transaction(|tx| {
                if let Some(sql) = &down_sql {
                    tx.execute_batch(sql)?;
                }
                tx.execute(
                    "DELETE FROM _migrations WHERE name = ?1",
                    &[Value::from(name.clone())],
                )?;
                Ok(())
            })
            .map_err(|source| MigrateError::MigrationFailed {
                name: name.clone(),
                source,
            })?;

        Ok(DownOutcome::RolledBack {
            name,
            script_ran: down_sql.is_some(),
        })
    }

    /// Reports the applied/pending state of every discovered migration,
    /// plus applied records whose files have gone missing.
    pub fn status(&self) -> Result<StatusReport> {
        let applied = self.applied()?;
        let discovered = files::discover(&self.dir)?;

        let entries: Vec<StatusEntry> = discovered
            .iter()
            .map(|m| StatusEntry {
                name: m.name.clone(),
                applied: applied.contains(&m.name),
                has_down: m.down_path.is_some(),
            })
            .collect();
        let orphaned_records: Vec<String> = applied
            .iter()
            .filter(|name| !discovered.iter().any(|m| &m.name == *name))
            .cloned()
            .collect();

        let applied_count = entries.iter().filter(|e| e.applied).count() + orphaned_records.len();
        let pending_count = entries.iter().filter(|e| !e.applied).count();
        Ok(StatusReport {
            entries,
            orphaned_records,
            applied_count,
            pending_count,
        })
    }

    /// Creates the bookkeeping table if it does not exist yet.
    fn ensure_bookkeeping(&self) -> Result<()> {
        self.db.execute(ENSURE_BOOKKEEPING_SQL, &[])?;
        Ok(())
    }
}
