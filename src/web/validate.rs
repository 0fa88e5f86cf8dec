//! Input rules shared by the gateway handlers.

use crate::web::error::ApiError;

/// Prefix of message text that is safe to log.
const LOG_PREVIEW_CHARS: usize = 50;
/// Characters kept at each end of a masked number.
const MASK_KEEP: usize = 4;
/// Shown instead of numbers too short to mask partially.
const FULL_MASK: &str = "****";

/// Require a value that is non-empty after trimming; returns it trimmed.
pub fn require_text<'a>(value: Option<&'a str>, error: &'static str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::validation(error)),
    }
}

/// Require a non-empty list whose entries are all non-blank; entries are trimmed.
pub fn require_list(
    values: Option<&[String]>,
    missing: &'static str,
    blank_entry: &'static str,
) -> Result<Vec<String>, ApiError> {
    let values = match values {
        Some(values) if !values.is_empty() => values,
        _ => return Err(ApiError::validation(missing)),
    };
    values
        .iter()
        .map(|value| require_text(Some(value), blank_entry).map(str::to_string))
        .collect()
}

/// Prefix `+` when absent.
pub fn normalize_phone(number: &str) -> String {
    let number = number.trim();
    if number.starts_with('+') {
        number.to_string()
    } else {
        format!("+{number}")
    }
}

/// First four and last four characters with the middle elided. Values shorter
/// than eight characters are hidden entirely.
pub fn mask_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() < MASK_KEEP * 2 {
        return FULL_MASK.to_string();
    }
    let head: String = chars[..MASK_KEEP].iter().collect();
    let tail: String = chars[chars.len() - MASK_KEEP..].iter().collect();
    format!("{head}...{tail}")
}

/// Truncated message text for log lines.
pub fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
