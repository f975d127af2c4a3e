//! Pre-pipeline abuse screening: honeypot and origin allow-list.
//!
//! Both checks are cheap header/field inspections that run before any
//! sanitization, rendering, or network work.

use tracing::debug;

/// Outcome of screening one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbuseVerdict {
    /// Looks legitimate; run the pipeline.
    Proceed,
    /// Honeypot tripped. Answer success-shaped and do nothing else, so the
    /// bot cannot tell it was caught.
    SilentlyAccept,
    /// Declared origin is not on the allow-list.
    Reject { origin: String },
}

/// Screen a request using only the honeypot field and the two origin headers.
///
/// The origin check runs first: a disallowed origin is rejected outright
/// even when the honeypot also tripped. Requests that declare no origin at
/// all pass, since same-origin form posts on some browsers omit both
/// headers.
pub fn screen(
    honeypot: Option<&str>,
    origin: Option<&str>,
    referer: Option<&str>,
    allowed: &[String],
) -> AbuseVerdict {
    if let Some(declared) = declared_origin(origin, referer) {
        if !origin_allowed(&declared, allowed) {
            return AbuseVerdict::Reject { origin: declared };
        }
    }

    if honeypot.is_some_and(|value| !value.trim().is_empty()) {
        debug!("Honeypot field was filled in");
        return AbuseVerdict::SilentlyAccept;
    }

    AbuseVerdict::Proceed
}

/// The origin the browser declared, if any.
///
/// Prefers the `origin` header and falls back to the origin part of
/// `referer`.
fn declared_origin(origin: Option<&str>, referer: Option<&str>) -> Option<String> {
    if let Some(value) = origin.map(str::trim).filter(|v| !v.is_empty()) {
        return Some(value.trim_end_matches('/').to_string());
    }
    referer.and_then(origin_of_url)
}

/// Extract `scheme://host[:port]` from a URL, without a full URL parser.
fn origin_of_url(url: &str) -> Option<String> {
    let url = url.trim();
    let scheme_end = url.find("://")?;
    let rest = &url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    if rest[..host_end].is_empty() {
        return None;
    }
    Some(url[..scheme_end + 3 + host_end].to_string())
}

/// Exact, case-insensitive match against the allow-list.
fn origin_allowed(declared: &str, allowed: &[String]) -> bool {
    let declared = declared.trim_end_matches('/');
    allowed.iter().any(|entry| entry.eq_ignore_ascii_case(declared))
}

// ── Tests ───────────────────────────────────────────────────────────────────
