//! Configured database access with parameterized execution.
//!
//! This crate is the query execution wrapper of the sqlward workspace: the
//! only component permitted to hold a live database connection. It provides:
//!
//! - [`DbConfig`] — connection target read once from the environment, with
//!   a distinct error per missing variable.
//! - [`Db`] — a caller-owned handle that connects lazily on first use,
//!   caches the outcome (including failure), and exposes parameterized
//!   [`execute`](Db::execute)/[`query`](Db::query) plus scoped
//!   [`transaction`](Db::transaction)s.
//! - [`ClientError`] — configuration errors that name the missing variable;
//!   execution errors normalized to a generic outward message with the
//!   driver detail reserved for logs.
//! - [`insert_message`] — the contact-form persistence path, which runs
//!   every external field through `sqlward-core` validation before a single
//!   parameterized INSERT.
//!
//! # Contract
//!
//! Callers never build SQL by concatenating untrusted values. Every
//! variable component travels through the positional params slice. Code
//! review treats a violation here as a defect regardless of what validation
//! happened upstream.
//!
//! # Example
//!
//! ```no_run
//! use sqlward_client::{Db, DbConfig};
//!
//! let config = DbConfig::from_env().unwrap();
//! let db = Db::new(config);
//! let rows = db.query("SELECT COUNT(*) FROM messages", &[]).unwrap();
//! println!("{rows:?}");
//! ```

mod config;
mod db;
mod error;
mod messages;

pub use config::{DbConfig, ENV_AUTH_TOKEN, ENV_DATABASE_URL};
pub use db::{Db, ExecResult, Row, Tx};
pub use error::{ClientError, Result};
pub use messages::{
    MAX_MESSAGE_LEN, MAX_NAME_LEN, MAX_SUBJECT_LEN, MessageError, NewMessage, insert_message,
};
