//! frontdesk — contact and booking intake for the Lowline studio site.

pub mod config;
pub mod contact;
pub mod error;
pub mod mailer;
pub mod server;
pub mod submission;
