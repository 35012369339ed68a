//! Schema lifecycle management: setup, reset, and ordered reversible
//! migrations.
//!
//! This crate owns every schema change in the sqlward workspace:
//!
//! - **`schema`** — idempotent creation and explicit destructive reset of
//!   the canonical application schema, with post-condition verification
//!   against the database catalog.
//! - **`files`** — discovery and scaffolding of `<stem>.up.sql` /
//!   `<stem>.down.sql` pairs; stems carry a sortable timestamp prefix so
//!   lexicographic order is chronological order.
//! - **`runner`** — the migration state machine: each migration's script
//!   and its bookkeeping row commit or roll back as one transaction, so
//!   the `_migrations` table never disagrees with the schema.
//!
//! All database access goes through the injected
//! [`Db`](sqlward_client::Db) handle; this crate never opens its own
//! connection.
//!
//! # Example
//!
//! ```no_run
//! use sqlward_client::{Db, DbConfig};
//! use sqlward_migrate::{Runner, setup_schema};
//!
//! let db = Db::new(DbConfig::from_env().unwrap());
//! setup_schema(&db).unwrap();
//!
//! let runner = Runner::new(&db, "migrations");
//! let report = runner.up().unwrap();
//! println!("applied {} migration(s)", report.applied.len());
//! ```

mod error;
mod files;
mod runner;
mod schema;

pub use error::{MigrateError, Result};
pub use files::{MigrationFile, create, discover};
pub use runner::{
    DownOutcome, MIGRATIONS_TABLE, Runner, StatusEntry, StatusReport, UpReport,
};
pub use schema::{
    MESSAGES_TABLE, SetupOutcome, reset_schema, schema_exists, setup_schema, table_exists,
};
