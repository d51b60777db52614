//! Field parsing utilities for CVM disclosure rows
//!
//! Helpers for turning raw text fields into identifiers, split rows and
//! numbers. None of these fail: an empty identifier or a `None` number is
//! the signal callers use to skip a row.

/// Keep only the decimal digits of a registration number.
///
/// `"11.111.111/0001-11"` and `"11111111000111"` compare equal after this.
pub fn normalize_identifier(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Split one delimited line into trimmed fields.
///
/// A `"` toggles the quoted state and is dropped; the delimiter only splits
/// outside a quoted span. Doubled quotes are not an escape, so a field count
/// always matches what the upstream export produces for its header row.
pub fn split_delimited_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }
    fields.push(current.trim().to_string());

    fields
}

/// Parse a number written with `.` thousands and `,` decimal separators.
///
/// Every `.` is removed and the first `,` becomes the decimal point, so a
/// plain dot-decimal value like `"1234.5"` reads as `12345`. Returns `None`
/// for empty, invalid or non-finite input.
pub fn parse_locale_number(value: Option<&str>) -> Option<f64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replace('.', "").replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
