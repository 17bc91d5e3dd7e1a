//! Checkout and contact form field validation.
//!
//! Field-level checks the storefront runs before a form is submitted. Each
//! check returns the message to show next to the field, so callers can
//! collect messages across a whole form.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s-]{10,}$").expect("Invalid regex"));

/// A failed field check, carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid phone number")]
    InvalidPhone,
}

/// Rejects empty or whitespace-only input.
pub fn required(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required);
    }
    Ok(())
}

/// Validates an email address. Empty input counts as missing, not invalid.
pub fn email(value: &str) -> Result<(), FieldError> {
    required(value)?;
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// Validates a phone number: optional leading `+`, then at least ten digits,
/// spaces or dashes.
pub fn phone(value: &str) -> Result<(), FieldError> {
    required(value)?;
    if !PHONE_RE.is_match(value.trim()) {
        return Err(FieldError::InvalidPhone);
    }
    Ok(())
}
