//! Outbound adapters implementing domain ports for external services.
//!
//! - **crm**: reqwest-backed CRM registry lookup
//! - **gemini**: reqwest-backed generative model client
//! - **checkout**: simulated payment provider sessions
//! - **status**: HTTP health check for the status board
//!
//! Adapters are thin translators between domain types and wire formats. They
//! contain no business logic.

pub mod checkout;
pub mod crm;
pub mod gemini;
pub mod status;

/// Compact, length-limited rendering of an upstream response body for error
/// messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// `status N` or `status N: preview`.
pub(crate) fn status_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}
