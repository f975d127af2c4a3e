//! The submission pipeline: screening, sanitization, and rendering.

pub mod abuse;
pub mod form;
pub mod render;

pub use abuse::{AbuseVerdict, screen};
pub use form::{SanitizedSubmission, SubmissionInput, sanitize};
