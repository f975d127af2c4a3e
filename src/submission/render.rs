//! Rendering of the two notification emails.
//!
//! Pure string assembly. Every piece of submitted text is escaped exactly
//! once, at the point it is interpolated into an HTML context.

use crate::mailer::OutboundMessage;

use super::form::{NOT_SPECIFIED, SanitizedSubmission};

/// Replace the HTML-reserved characters with their entities.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The operator notification: every field of the lead, plus the full
/// message, with replies wired to the submitter.
pub fn operator_message(
    submission: &SanitizedSubmission,
    from: &str,
    inbox: &str,
) -> OutboundMessage {
    let mut rows = String::with_capacity(1024);
    for (label, value) in [
        ("Name", &submission.name),
        ("Email", &submission.email),
        ("Phone", &submission.phone),
        ("Service", &submission.service),
        ("Date", &submission.date),
        ("Location", &submission.location),
        ("Budget", &submission.budget),
    ] {
        rows.push_str(&format!(
            "<tr><td style=\"padding:6px 12px;color:#8a8a8a;\">{label}</td>\
             <td style=\"padding:6px 12px;\">{}</td></tr>",
            escape_html(value)
        ));
    }

    let html = format!(
        "<!DOCTYPE html><html><body style=\"font-family:Helvetica,Arial,sans-serif;\
         color:#1a1a1a;margin:0;padding:24px;\">\
         <div style=\"max-width:560px;margin:0 auto;\">\
         <h2 style=\"margin:0 0 16px;\">New booking inquiry</h2>\
         <table style=\"border-collapse:collapse;width:100%;\">{rows}</table>\
         <h3 style=\"margin:24px 0 8px;\">Message</h3>\
         <div style=\"padding:12px;background:#f5f5f4;border-radius:4px;\
         line-height:1.5;\">{message}</div>\
         <p style=\"margin-top:24px;color:#8a8a8a;font-size:12px;\">\
         Sent by the lowline.studio contact form</p>\
         </div></body></html>",
        message = as_html_paragraph(&submission.message),
    );

    OutboundMessage {
        from: from.to_string(),
        to: vec![inbox.to_string()],
        reply_to: Some(submission.email.clone()),
        subject: format!("New booking inquiry: {}", submission.service),
        html,
    }
}

/// The acknowledgement sent back to the submitter.
///
/// Deliberately does not echo the message text back; a copy of their own
/// words in an automated reply reads as spam and gets these flagged.
pub fn client_message(
    submission: &SanitizedSubmission,
    from: &str,
    inbox: &str,
) -> OutboundMessage {
    let greeting = if submission.name == NOT_SPECIFIED {
        "Hello,".to_string()
    } else {
        format!("Hi {},", escape_html(&submission.name))
    };

    let opener = if submission.service == NOT_SPECIFIED {
        "Thanks for reaching out to Lowline Studio.".to_string()
    } else {
        format!(
            "Thanks for reaching out to Lowline Studio about {}.",
            escape_html(&submission.service)
        )
    };

    let html = format!(
        "<!DOCTYPE html><html><body style=\"font-family:Helvetica,Arial,sans-serif;\
         color:#1a1a1a;margin:0;padding:24px;\">\
         <div style=\"max-width:560px;margin:0 auto;line-height:1.6;\">\
         <p>{greeting}</p>\
         <p>{opener} We've received your inquiry and will get back to you \
         within two business days.</p>\
         <p>If you'd like to add anything in the meantime, just reply to \
         this email.</p>\
         <p style=\"margin-top:24px;\">The Lowline team</p>\
         </div></body></html>",
    );

    OutboundMessage {
        from: from.to_string(),
        to: vec![submission.email.clone()],
        reply_to: Some(inbox.to_string()),
        subject: "We received your inquiry".to_string(),
        html,
    }
}

/// Escape a message body and turn line breaks into `<br>` tags.
fn as_html_paragraph(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

// ── Tests ───────────────────────────────────────────────────────────────────
