use chrono::{DateTime, Utc};

use crate::auth::token;

/// Maximum length for response bodies embedded in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
pub fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

/// Human readable token lifetime, e.g. "expires in 42m" or "expired 3h ago"
pub fn format_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (expires_at - now).num_minutes();
    if expires_at <= now {
        format!("expired {} ago", format_minutes(-minutes))
    } else {
        format!("expires in {}", format_minutes(minutes))
    }
}

/// Cached token state as shown by `status`
pub fn describe_token(id_token: &str, now: DateTime<Utc>) -> String {
    if id_token.is_empty() {
        return "missing".to_string();
    }
    match token::expires_at(id_token) {
        Some(exp) => format_expiry(exp, now),
        None => "unreadable (will be refreshed on next upload)".to_string(),
    }
}

fn format_minutes(minutes: i64) -> String {
    if minutes < 1 {
        "<1m".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 1440 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{}d", minutes / 1440)
    }
}
