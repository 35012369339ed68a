//! Validated field results and the rejection taxonomy.
//!
//! Every validator in this crate returns a [`ValidatedField`]: either the
//! normalized (trimmed, type-checked, length-bounded) value, or a
//! [`Rejection`] describing why the input was refused. Rejection messages
//! are deliberately generic — they never echo the offending raw value or
//! reveal which pattern matched, so they are safe to return verbatim to a
//! remote caller.

use serde::Serialize;
use thiserror::Error;

/// Why an external input value was refused.
///
/// The `Display` impl produces a human-safe category string suitable for
/// end-user error responses. Detailed diagnostics (which pattern matched,
/// input length) are emitted through `tracing` at debug level instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Rejection {
    /// Value was not a string where a string was required.
    #[error("must be text")]
    NotAString,
    /// Value was empty (or whitespace-only) after trimming.
    #[error("must not be empty")]
    Empty,
    /// Trimmed value exceeds the declared length bound.
    #[error("too long (maximum {max} characters)")]
    TooLong {
        /// The declared maximum length.
        max: usize,
    },
    /// Value matched a known-dangerous character or keyword pattern.
    #[error("contains unsafe characters")]
    UnsafeContent,
    /// Value does not look like a `local@domain.tld` address.
    #[error("must be a valid email address")]
    InvalidEmail,
    /// Value could not be interpreted as a finite number.
    #[error("must be a number")]
    NotANumber,
    /// Numeric value falls outside the declared range.
    #[error("must be between {min} and {max}")]
    OutOfRange {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
}

/// Result of passing a raw external value through a validator.
///
/// A success value is guaranteed free of the rejection patterns and within
/// the declared length bounds; it is not guaranteed semantically valid
/// beyond that (a well-formed address for a nonexistent mailbox still
/// passes).
pub type ValidatedField<T> = Result<T, Rejection>;
