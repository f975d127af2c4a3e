//! Booking form input and its sanitized form.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ValidationError;

// ── Field limits ────────────────────────────────────────────────────────────

const MAX_NAME: usize = 80;
const MAX_EMAIL: usize = 120;
const MAX_PHONE: usize = 40;
const MAX_SERVICE: usize = 80;
const MAX_DATE: usize = 40;
const MAX_LOCATION: usize = 120;
const MAX_BUDGET: usize = 80;
const MAX_MESSAGE: usize = 5_000;

/// Minimum length of the free-text message after trimming and capping.
const MIN_MESSAGE: usize = 10;

/// Stand-in for optional fields the visitor left empty, so rendered
/// notifications never show blank cells.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Deliberately permissive: one `@`, something before it, a dot in the
/// domain, no whitespace. The mail provider is the real authority.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// ── Types ───────────────────────────────────────────────────────────────────

/// Raw, untrusted form body as posted by the site.
///
/// Every field is optional at the wire level; unknown fields are ignored.
/// Nothing here is trusted until it has passed through [`sanitize`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SubmissionInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
    /// Honeypot. Hidden on the real form, so humans leave it empty.
    pub company: Option<String>,
}

/// A submission after trimming, clamping, and validation.
///
/// Fields are plain text, bounded in length, and safe to log. HTML escaping
/// is deliberately not done here; it happens at render time so the data
/// stays usable in subjects and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    pub name: String,
    /// Lower-cased and shape-checked.
    pub email: String,
    /// Digits plus an optional leading `+`, or the placeholder.
    pub phone: String,
    pub service: String,
    pub date: String,
    pub location: String,
    pub budget: String,
    /// At least [`MIN_MESSAGE`] characters, trimmed, interior newlines kept.
    pub message: String,
}

// ── Sanitization ────────────────────────────────────────────────────────────

/// Sanitize a raw submission into its validated form.
///
/// Optional fields are trimmed, capped, and defaulted to the placeholder;
/// truncation is silent. Email and message are required and produce a
/// [`ValidationError`] when they fail. Running the output back through
/// this function yields the same record.
pub fn sanitize(input: &SubmissionInput) -> Result<SanitizedSubmission, ValidationError> {
    let email: String = input
        .email
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase()
        .chars()
        .take(MAX_EMAIL)
        .collect();
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    // The length floor applies to the message as stored: cap it and drop
    // whitespace the cap strands before counting.
    let capped: String = input
        .message
        .as_deref()
        .unwrap_or("")
        .trim()
        .chars()
        .take(MAX_MESSAGE)
        .collect();
    let message = capped.trim_end().to_string();
    if message.chars().count() < MIN_MESSAGE {
        return Err(ValidationError::MessageTooShort);
    }

    Ok(SanitizedSubmission {
        name: clamp(input.name.as_deref(), MAX_NAME),
        email,
        phone: normalize_phone(input.phone.as_deref()),
        service: clamp(input.service.as_deref(), MAX_SERVICE),
        date: clamp(input.date.as_deref(), MAX_DATE),
        location: clamp(input.location.as_deref(), MAX_LOCATION),
        budget: clamp(input.budget.as_deref(), MAX_BUDGET),
        message,
    })
}

/// Trim and cap an optional field, falling back to the placeholder.
///
/// Whitespace stranded when the cap lands inside a run of it is dropped
/// too, so a clamped value passes through unchanged a second time.
fn clamp(value: Option<&str>, max: usize) -> String {
    let trimmed = value.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return NOT_SPECIFIED.to_string();
    }
    let capped: String = trimmed.chars().take(max).collect();
    capped.trim_end().to_string()
}

/// Strip a phone field down to digits plus an optional leading `+`.
///
/// Formatting characters (spaces, dashes, dots, parentheses) vanish; a field
/// with no digits at all resolves to the placeholder like any empty field.
fn normalize_phone(value: Option<&str>) -> String {
    let trimmed = value.map(str::trim).unwrap_or("");
    let mut digits = String::with_capacity(trimmed.len());
    for (i, ch) in trimmed.chars().enumerate() {
        if ch.is_ascii_digit() || (ch == '+' && i == 0) {
            digits.push(ch);
        }
    }
    if digits.is_empty() || digits == "+" {
        return NOT_SPECIFIED.to_string();
    }
    digits.chars().take(MAX_PHONE).collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────
