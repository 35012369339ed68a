//! Connection configuration sourced from the environment.
//!
//! Two variables are required: the database URL and an auth credential.
//! Each missing variable produces its own error variant so operators see
//! exactly which one to fix rather than a combined failure.
//!
//! Configuration is read by the caller once per process ([`DbConfig::from_env`])
//! and injected into the [`Db`](crate::Db) handle; nothing in this crate
//! reads the environment implicitly, so merely linking the crate never
//! fails on an unconfigured machine.

use std::env;

use crate::error::{ClientError, Result};

/// Environment variable holding the database URL (a `file:` URI or path).
pub const ENV_DATABASE_URL: &str = "SQLWARD_DATABASE_URL";

/// Environment variable holding the database auth credential.
pub const ENV_AUTH_TOKEN: &str = "SQLWARD_AUTH_TOKEN";

/// A validated connection target.
///
/// Both fields are guaranteed non-empty once constructed. The auth token is
/// held for drivers that transmit a credential; the embedded SQLite driver
/// validates its presence for deployment parity but does not send it
/// anywhere.
#[derive(Debug, Clone)]
pub struct DbConfig {
    url: String,
    auth_token: String,
}

impl DbConfig {
    /// Builds a config from explicit values, primarily for tests and
    /// embedding callers that manage configuration themselves.
    ///
    /// # Errors
    ///
    /// Returns the variable-specific error if either value is empty.
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let auth_token = auth_token.into();
        if url.trim().is_empty() {
            return Err(ClientError::MissingUrl);
        }
        if auth_token.trim().is_empty() {
            return Err(ClientError::MissingAuthToken);
        }
        Ok(Self { url, auth_token })
    }

    /// Reads and validates the connection target from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingUrl`] or [`ClientError::MissingAuthToken`]
    /// for whichever variable is unset or empty; the URL is checked first.
    pub fn from_env() -> Result<Self> {
        let url = env::var(ENV_DATABASE_URL).unwrap_or_default();
        let auth_token = env::var(ENV_AUTH_TOKEN).unwrap_or_default();
        Self::new(url, auth_token)
    }

    /// Whether both required variables are present in the environment.
    ///
    /// Pure presence check: never errors and never opens a connection.
    pub fn is_configured() -> bool {
        let set = |name: &str| env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false);
        set(ENV_DATABASE_URL) && set(ENV_AUTH_TOKEN)
    }

    /// The database URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The auth credential.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}
