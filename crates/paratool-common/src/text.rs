//! Quoted-field helpers for the line-oriented text formats.
//!
//! Stat files and treasure tables share the same shape: a keyword followed by
//! one or two double-quoted fields. Both parsers tolerate a missing closing
//! quote by taking the remainder of the line.

/// Extract the first double-quoted field of a line.
///
/// Returns an empty string when the line has no quote at all, and the rest of
/// the line when the closing quote is missing.
pub fn first_quoted(line: &str) -> &str {
    let Some(first) = line.find('"') else {
        return "";
    };
    let rest = &line[first + 1..];
    match rest.find('"') {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Extract the first double-quoted field only if it is terminated.
pub fn closed_quoted(line: &str) -> Option<&str> {
    let first = line.find('"')?;
    let rest = &line[first + 1..];
    rest.find('"').map(|end| &rest[..end])
}

/// Extract a `"key" "value"` pair from a line.
///
/// Returns `None` when the key is missing or unterminated. A missing value is
/// the empty string; an unterminated value runs to the end of the line.
pub fn quoted_pair(line: &str) -> Option<(&str, &str)> {
    let first = line.find('"')?;
    let after_first = &line[first + 1..];
    let key_end = after_first.find('"')?;
    let key = &after_first[..key_end];

    let after_key = &after_first[key_end + 1..];
    let Some(value_start) = after_key.find('"') else {
        return Some((key, ""));
    };
    let value = &after_key[value_start + 1..];
    match value.find('"') {
        Some(end) => Some((key, &value[..end])),
        None => Some((key, value)),
    }
}
