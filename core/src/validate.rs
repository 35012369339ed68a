//! Field validators for untrusted external input.
//!
//! One validator per field kind. Each takes an untyped external value
//! (`serde_json::Value`, the shape request bodies arrive in) and returns a
//! [`ValidatedField`]: the trimmed, bounded value on success, a generic
//! [`Rejection`] on failure. Validators never panic.
//!
//! All string validators trim leading/trailing whitespace before length and
//! pattern checks, and the trimmed value is what is returned on success —
//! whitespace-only input is therefore "empty".
//!
//! The character/keyword denylist in [`validate_free_text`] is
//! defense-in-depth, not the primary injection defense: every query in this
//! workspace is parameterized regardless. Catching obviously malicious
//! payloads here yields clearer user-facing errors and an audit signal,
//! but the denylist can both over-reject legitimate names and under-reject
//! obfuscated payloads. Do not rely on it as a security boundary.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use sqlward_core::{validate_email, validate_free_text, Rejection};
//!
//! assert_eq!(validate_email(&json!("user@example.com")).unwrap(), "user@example.com");
//! assert_eq!(validate_free_text(&json!("  Jane Smith  "), 100).unwrap(), "Jane Smith");
//! assert_eq!(
//!     validate_free_text(&json!("'; DROP TABLE messages; --"), 100),
//!     Err(Rejection::UnsafeContent)
//! );
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::field::{Rejection, ValidatedField};

/// Maximum length of an email address, per RFC 5321's path limit.
pub const MAX_EMAIL_LEN: usize = 254;

/// Conservative `local@domain.tld` shape. Intentionally stricter than the
/// RFC grammar: no quoted local parts, no address literals, TLD required.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9](?:[A-Za-z0-9.-]*[A-Za-z0-9])?\.[A-Za-z]{2,}$")
        .unwrap()
});

/// SQL keywords rejected as whole words, case-insensitive.
static SQL_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(select|insert|update|delete|drop|union)\b").unwrap());

/// Validates an email address field.
///
/// Fails if the value is not a string, empty after trimming, longer than
/// [`MAX_EMAIL_LEN`], or not shaped like `local@domain.tld`. Success
/// returns the trimmed address; no attempt is made to verify the mailbox
/// exists.
pub fn validate_email(value: &Value) -> ValidatedField<String> {
    let trimmed = require_trimmed(value)?;
    if trimmed.chars().count() > MAX_EMAIL_LEN {
        return Err(Rejection::TooLong { max: MAX_EMAIL_LEN });
    }
    if !EMAIL_RE.is_match(trimmed) {
        debug!(len = trimmed.len(), "rejected email: shape mismatch");
        return Err(Rejection::InvalidEmail);
    }
    Ok(trimmed.to_string())
}

/// Validates a short free-text field such as a person's name.
///
/// Beyond the string/emptiness/length checks, the trimmed value is refused
/// if it contains quote or semicolon characters, SQL comment markers
/// (`--`, `/*`, `*/`), or one of the denylisted SQL keywords as a whole
/// word, case-insensitive. The rejection reason is always the generic
/// [`Rejection::UnsafeContent`]; which pattern matched is logged at debug
/// level only.
pub fn validate_free_text(value: &Value, max_len: usize) -> ValidatedField<String> {
    let trimmed = require_bounded(value, max_len)?;
    if let Some(pattern) = unsafe_pattern(trimmed) {
        debug!(pattern, len = trimmed.len(), "rejected free text: unsafe pattern");
        return Err(Rejection::UnsafeContent);
    }
    Ok(trimmed.to_string())
}

/// Validates a long free-prose field such as a message body.
///
/// Only string/emptiness/length checks apply. Prose legitimately contains
/// words like "select" and apostrophes, so no pattern filtering happens
/// here — parameterization downstream is the actual defense.
pub fn validate_message_body(value: &Value, max_len: usize) -> ValidatedField<String> {
    Ok(require_bounded(value, max_len)?.to_string())
}

/// Validates an optional text field such as a subject line.
///
/// `null` and empty-or-whitespace strings are valid "absent" and normalize
/// to `None`. Present values get the same string/length checks as free
/// text, without keyword filtering.
pub fn validate_optional_text(value: &Value, max_len: usize) -> ValidatedField<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let Value::String(raw) = value else {
        return Err(Rejection::NotAString);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_len {
        return Err(Rejection::TooLong { max: max_len });
    }
    Ok(Some(trimmed.to_string()))
}

/// Validates a bounded integer field such as a result limit.
///
/// Accepts numeric or numeric-string input. Coercion failures (including
/// non-finite results) are [`Rejection::NotANumber`]; finite values outside
/// `min..=max` are [`Rejection::OutOfRange`]. Fractional input is truncated
/// toward zero after the range check.
pub fn validate_bounded_integer(value: &Value, min: i64, max: i64) -> ValidatedField<i64> {
    let n = match value {
        Value::Number(n) => n.as_f64().ok_or(Rejection::NotANumber)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| Rejection::NotANumber)?,
        _ => return Err(Rejection::NotANumber),
    };
    if !n.is_finite() {
        return Err(Rejection::NotANumber);
    }
    if n < min as f64 || n > max as f64 {
        return Err(Rejection::OutOfRange { min, max });
    }
    Ok(n.trunc() as i64)
}

/// Extracts a trimmed, non-empty string or rejects.
fn require_trimmed(value: &Value) -> Result<&str, Rejection> {
    let Value::String(raw) = value else {
        return Err(Rejection::NotAString);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Empty);
    }
    Ok(trimmed)
}

/// Extracts a trimmed, non-empty, length-bounded string or rejects.
fn require_bounded(value: &Value, max_len: usize) -> Result<&str, Rejection> {
    let trimmed = require_trimmed(value)?;
    if trimmed.chars().count() > max_len {
        return Err(Rejection::TooLong { max: max_len });
    }
    Ok(trimmed)
}

/// Returns the name of the first dangerous pattern found, if any.
fn unsafe_pattern(text: &str) -> Option<&'static str> {
    if text.contains('\'') || text.contains('"') {
        return Some("quote");
    }
    if text.contains(';') {
        return Some("semicolon");
    }
    if text.contains("--") || text.contains("/*") || text.contains("*/") {
        return Some("comment marker");
    }
    if SQL_KEYWORD_RE.is_match(text) {
        return Some("sql keyword");
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_validate_email_accepts_plain_address() {
        assert_eq!(
            validate_email(&json!("user@example.com")).unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn test_validate_email_trims_whitespace() {
        assert_eq!(
            validate_email(&json!("  user@example.com\n")).unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn test_validate_email_rejects_non_string() {
        assert_eq!(validate_email(&json!(42)), Err(Rejection::NotAString));
        assert_eq!(validate_email(&json!(null)), Err(Rejection::NotAString));
    }

    #[test]
    fn test_validate_email_rejects_shape_mismatch() {
        assert_eq!(validate_email(&json!("not-an-email")), Err(Rejection::InvalidEmail));
        assert_eq!(validate_email(&json!("user@")), Err(Rejection::InvalidEmail));
        assert_eq!(validate_email(&json!("user@host")), Err(Rejection::InvalidEmail));
        assert_eq!(validate_email(&json!("@example.com")), Err(Rejection::InvalidEmail));
    }

    #[test]
    fn test_validate_email_rejects_overlong_address() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&json!(long)),
            Err(Rejection::TooLong { max: MAX_EMAIL_LEN })
        );
    }

    #[test]
    fn test_validate_email_rejects_whitespace_only() {
        assert_eq!(validate_email(&json!("   ")), Err(Rejection::Empty));
    }

    #[test]
    fn test_validate_free_text_accepts_plain_names() {
        for name in ["John Doe", "OConnor", "Jane Smith"] {
            assert_eq!(validate_free_text(&json!(name), 100).unwrap(), name);
        }
    }

    #[test]
    fn test_validate_free_text_returns_trimmed_value() {
        assert_eq!(validate_free_text(&json!("  Jane Smith "), 100).unwrap(), "Jane Smith");
    }

    #[test]
    fn test_validate_free_text_rejects_injection_payloads() {
        let payloads = [
            "'; DROP TABLE messages; --",
            "' OR '1'='1",
            "admin'--",
            "' UNION SELECT * FROM sqlite_master --",
        ];
        for payload in payloads {
            assert_eq!(
                validate_free_text(&json!(payload), 200),
                Err(Rejection::UnsafeContent),
                "payload should be rejected: {payload}"
            );
        }
    }

    #[test]
    fn test_validate_free_text_rejects_keywords_as_whole_words_only() {
        // Substrings are fine; only whole words match.
        assert!(validate_free_text(&json!("Selena Updategren"), 100).is_ok());
        assert!(validate_free_text(&json!("Selena"), 100).is_ok());
        assert_eq!(
            validate_free_text(&json!("please DROP this"), 100),
            Err(Rejection::UnsafeContent)
        );
    }

    #[test]
    fn test_validate_free_text_rejects_comment_markers() {
        assert_eq!(validate_free_text(&json!("x /* y */"), 100), Err(Rejection::UnsafeContent));
        assert_eq!(validate_free_text(&json!("a--b"), 100), Err(Rejection::UnsafeContent));
    }

    #[test]
    fn test_validate_free_text_length_bound_applies_after_trim() {
        // Five significant characters, padded with whitespace.
        assert!(validate_free_text(&json!("  abcde  "), 5).is_ok());
        assert_eq!(
            validate_free_text(&json!("abcdef"), 5),
            Err(Rejection::TooLong { max: 5 })
        );
    }

    #[test]
    fn test_validate_message_body_allows_prose_with_keywords() {
        let body = "Please select the O'Connor account; I can't update it myself.";
        assert_eq!(validate_message_body(&json!(body), 2000).unwrap(), body);
    }

    #[test]
    fn test_validate_message_body_rejects_empty_and_overlong() {
        assert_eq!(validate_message_body(&json!("   "), 2000), Err(Rejection::Empty));
        assert_eq!(
            validate_message_body(&json!("a".repeat(2001)), 2000),
            Err(Rejection::TooLong { max: 2000 })
        );
    }

    #[test]
    fn test_validate_optional_text_normalizes_absent_values() {
        assert_eq!(validate_optional_text(&json!(null), 100).unwrap(), None);
        assert_eq!(validate_optional_text(&json!(""), 100).unwrap(), None);
        assert_eq!(validate_optional_text(&json!("   "), 100).unwrap(), None);
    }

    #[test]
    fn test_validate_optional_text_trims_present_values() {
        assert_eq!(
            validate_optional_text(&json!(" Hello "), 100).unwrap(),
            Some("Hello".to_string())
        );
    }

    #[test]
    fn test_validate_optional_text_rejects_non_string_and_overlong() {
        assert_eq!(validate_optional_text(&json!(3), 100), Err(Rejection::NotAString));
        assert_eq!(
            validate_optional_text(&json!("a".repeat(101)), 100),
            Err(Rejection::TooLong { max: 100 })
        );
    }

    #[test]
    fn test_validate_bounded_integer_accepts_numbers_and_numeric_strings() {
        assert_eq!(validate_bounded_integer(&json!(10), 1, 50).unwrap(), 10);
        assert_eq!(validate_bounded_integer(&json!("25"), 1, 50).unwrap(), 25);
        assert_eq!(validate_bounded_integer(&json!(" 7 "), 1, 50).unwrap(), 7);
    }

    #[test]
    fn test_validate_bounded_integer_truncates_fractions() {
        assert_eq!(validate_bounded_integer(&json!(10.9), 1, 50).unwrap(), 10);
    }

    #[test]
    fn test_validate_bounded_integer_rejects_non_numeric() {
        assert_eq!(validate_bounded_integer(&json!("ten"), 1, 50), Err(Rejection::NotANumber));
        assert_eq!(validate_bounded_integer(&json!(true), 1, 50), Err(Rejection::NotANumber));
        assert_eq!(validate_bounded_integer(&json!("NaN"), 1, 50), Err(Rejection::NotANumber));
        assert_eq!(
            validate_bounded_integer(&json!("Infinity"), 1, 50),
            Err(Rejection::NotANumber)
        );
    }

    #[test]
    fn test_validate_bounded_integer_rejects_out_of_range() {
        assert_eq!(
            validate_bounded_integer(&json!(0), 1, 50),
            Err(Rejection::OutOfRange { min: 1, max: 50 })
        );
        assert_eq!(
            validate_bounded_integer(&json!("51"), 1, 50),
            Err(Rejection::OutOfRange { min: 1, max: 50 })
        );
    }
}
