//! Validation primitives for untrusted external input.
//!
//! This crate is the validation boundary of the sqlward workspace: pure
//! functions that check and normalize individual untrusted fields before
//! they reach any SQL-adjacent code path.
//!
//! - [`validate_email`] — conservative `local@domain.tld` shape, 254-char cap.
//! - [`validate_free_text`] — name-like fields, with a denylist of quote,
//!   semicolon, comment-marker, and SQL-keyword patterns.
//! - [`validate_message_body`] — long prose, length-bounded only.
//! - [`validate_optional_text`] — absent-friendly subject-like fields.
//! - [`validate_bounded_integer`] — numeric or numeric-string limits.
//!
//! Validators never panic and never throw: every outcome is a
//! [`ValidatedField`] value the caller maps to its own response shape
//! (typically an HTTP 400). Rejection messages are generic: the offending
//! input is never echoed back to an external caller.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sqlward_core::*;
//!
//! let name = validate_free_text(&json!("  Ada Lovelace "), 100).unwrap();
//! assert_eq!(name, "Ada Lovelace");
//!
//! let limit = validate_bounded_integer(&json!("25"), 1, 50).unwrap();
//! assert_eq!(limit, 25);
//!
//! assert!(validate_free_text(&json!("admin'--"), 100).is_err());
//! ```

mod field;
mod validate;

pub use field::{Rejection, ValidatedField};
pub use validate::{
    MAX_EMAIL_LEN, validate_bounded_integer, validate_email, validate_free_text,
    validate_message_body, validate_optional_text,
};
