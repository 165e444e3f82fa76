//! Small string helpers shared by prompt builders and payload mappers.

/// Return at most `max_chars` characters of `text` without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Round to one decimal place, the precision used for every user-facing score.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to four decimals, enough for a 0..=1 similarity.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Join non-empty values with `", "`, or return `fallback` when nothing remains.
pub(crate) fn join_or(values: &[String], fallback: &str) -> String {
    let parts: Vec<&str> = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();
    if parts.is_empty() {
        fallback.to_string()
    } else {
        parts.join(", ")
    }
}

/// Split a comma, semicolon, or newline separated list into trimmed entries.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
