//! Input rules shared by request DTOs.
//!
//! Length rules are attached to the DTOs with `validator` derives. The rules
//! here need code (date parsing, character classes, per-item lengths) and are
//! called explicitly by handlers.

use chrono::NaiveDate;

use crate::query::filter::DATE_FORMAT;

/// Separator between the two halves of a date-range filter.
pub const DATE_RANGE_SEPARATOR: char = ':';

/// Parse a strict `YYYY-MM-DD` date.
///
/// `chrono` accepts unpadded components, so the shape is checked first.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Split a `release_date` filter into one date or an ordered pair.
///
/// Returns an error message suitable for a field-attributed validation error.
pub fn split_date_filter(raw: &str) -> Result<Vec<String>, String> {
    let parts: Vec<&str> = raw.split(DATE_RANGE_SEPARATOR).collect();
    if parts.len() > 2 {
        return Err("must be YYYY-MM-DD or YYYY-MM-DD:YYYY-MM-DD".into());
    }

    let mut dates = Vec::with_capacity(parts.len());
    for part in &parts {
        if parse_date(part).is_none() {
            return Err("must be YYYY-MM-DD or YYYY-MM-DD:YYYY-MM-DD".into());
        }
        dates.push(part.to_string());
    }

    if dates.len() == 2 && dates[0] > dates[1] {
        return Err("the first date must not be after the second date".into());
    }
    Ok(dates)
}

/// Usernames are ASCII letters, digits and underscores.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check that every item's character count lies in `min..=max`.
///
/// Returns the first offending item.
pub fn find_item_out_of_bounds<'a>(items: &'a [String], min: usize, max: usize) -> Option<&'a str> {
    items
        .iter()
        .find(|item| {
            let len = item.trim().chars().count();
            len < min || len > max
        })
        .map(String::as_str)
}
