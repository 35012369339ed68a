//! Error types for database client operations.
//!
//! Configuration errors name the specific missing variable so an operator
//! can fix it in one pass. Execution errors are normalized: the `Display`
//! message is a fixed generic string safe to return to a remote caller,
//! while the driver-level detail is carried separately for operator-facing
//! logs and `--verbose` output.

use thiserror::Error;

use crate::config::{ENV_AUTH_TOKEN, ENV_DATABASE_URL};

/// Errors that can occur while configuring or using the database client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The database URL environment variable is unset or empty.
    #[error("missing required environment variable: {ENV_DATABASE_URL}")]
    MissingUrl,

    /// The auth token environment variable is unset or empty.
    #[error("missing required environment variable: {ENV_AUTH_TOKEN}")]
    MissingAuthToken,

    /// A driver-level failure (connection, syntax, constraint, I/O).
    ///
    /// The message is intentionally generic; `detail` holds the underlying
    /// driver error and must only reach local logs or opt-in verbose output.
    #[error("database operation failed")]
    Execution {
        /// Driver-level cause, for operator diagnostics only.
        detail: String,
    },
}

impl ClientError {
    /// The underlying cause, where one exists. Never part of `Display`.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Execution { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;
