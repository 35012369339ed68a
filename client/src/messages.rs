//! Contact-message persistence: the one code path that accepts external
//! (non-operator) input.
//!
//! Every field of the incoming payload passes through the `sqlward-core`
//! validators before the single parameterized INSERT runs. Validation here
//! is early rejection and audit signal; the parameterization in
//! [`Db::execute`](crate::Db::execute) is what actually keeps hostile
//! values out of the SQL.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use sqlward_core::{
    Rejection, validate_email, validate_free_text, validate_message_body, validate_optional_text,
};

use crate::db::Db;
use crate::error::ClientError;

/// Maximum length of the sender name.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum length of the optional subject line.
pub const MAX_SUBJECT_LEN: usize = 200;
/// Maximum length of the message body.
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Failure to accept a contact message.
#[derive(Debug, Clone, Error)]
pub enum MessageError {
    /// A payload field failed validation. Carries the field name and the
    /// user-safe rejection reason only — never the raw value.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Which payload field was rejected.
        field: &'static str,
        /// The generic rejection category.
        reason: Rejection,
    },

    /// The underlying database operation failed.
    #[error(transparent)]
    Db(#[from] ClientError),
}

/// A fully validated contact message, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Sender name, denylist-checked free text.
    pub name: String,
    /// Sender address, conservative shape check.
    pub email: String,
    /// Optional subject, `None` when absent or blank.
    pub subject: Option<String>,
    /// Message body, length-bounded prose.
    pub message: String,
}

impl NewMessage {
    /// Validates an untyped payload (`{name, email, subject?, message}`)
    /// into a [`NewMessage`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Invalid`] naming the first field that fails;
    /// missing fields validate as JSON `null` and fail accordingly.
    pub fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        static NULL: Value = Value::Null;
        let field = |name: &str| payload.get(name).unwrap_or(&NULL);
        let invalid = |field: &'static str| move |reason| MessageError::Invalid { field, reason };

        Ok(Self {
            name: validate_free_text(field("name"), MAX_NAME_LEN).map_err(invalid("name"))?,
            email: validate_email(field("email")).map_err(invalid("email"))?,
            subject: validate_optional_text(field("subject"), MAX_SUBJECT_LEN)
                .map_err(invalid("subject"))?,
            message: validate_message_body(field("message"), MAX_MESSAGE_LEN)
                .map_err(invalid("message"))?,
        })
    }
}

/// Validates the payload and inserts it into the `messages` table.
///
/// Returns the new row id. The schema must already exist (see
/// `sqlward-migrate`).
pub fn insert_message(db: &Db, payload: &Value) -> Result<i64, MessageError> {
    let msg = NewMessage::from_payload(payload)?;
    let result = db.execute(
        "INSERT INTO messages (name, email, subject, message) VALUES (?1, ?2, ?3, ?4)",
        &[
            SqlValue::from(msg.name),
            SqlValue::from(msg.email),
            msg.subject.map_or(SqlValue::Null, SqlValue::from),
            SqlValue::from(msg.message),
        ],
    )?;
    info!(id = result.last_insert_rowid, "stored contact message");
    Ok(result.last_insert_rowid)
}
