//! Error types for schema and migration operations.

use thiserror::Error;

use sqlward_client::ClientError;

/// Errors that can occur during schema setup or migration runs.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Database client failure (configuration or execution).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Migration file or directory I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A named migration failed to apply or roll back. The driver detail
    /// lives in the source error, for logs and verbose output only.
    #[error("migration '{name}' failed")]
    MigrationFailed {
        /// The migration's name stem.
        name: String,
        /// The normalized client error that aborted the step.
        #[source]
        source: ClientError,
    },

    /// Migration name produces an empty slug.
    #[error("invalid migration name: produces an empty slug")]
    InvalidName,

    /// Scaffolding would overwrite an existing migration pair.
    #[error("migration files already exist for '{0}'")]
    AlreadyExists(String),

    /// Schema creation appeared to succeed but post-verification did not
    /// find the expected table. Needs operator attention; never silently
    /// treated as success.
    #[error("schema unverified: table '{0}' not present after setup")]
    Unverified(String),
}

impl MigrateError {
    /// Driver-level detail, where one exists. Never part of `Display`;
    /// surfaced only through logs and opt-in verbose output.
    pub fn detail(&self) -> Option<&str> {
        match self {
            MigrateError::Client(e) => e.detail(),
            MigrateError::MigrationFailed { source, .. } => source.detail(),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`MigrateError`].
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failed_keeps_detail_out_of_display() {
        let err = MigrateError::MigrationFailed {
            name: "2025-08-08T12-00-00_add_users".to_string(),
            source: ClientError::Execution {
                detail: "near \"CREAT\": syntax error".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("add_users"));
        assert!(!msg.contains("syntax error"));
    }
}
