// Utility functions
use regex::Regex;

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses human formatted counts such as `1,234`, `12.5K` or `3M`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace([',', ' ', '\u{a0}'], "");
    let (number, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'b' | 'B' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// Finds the first `<count> <label>` occurrence in `text`, e.g. "12.3K followers".
pub fn find_labelled_count(text: &str, labels: &[&str]) -> Option<u64> {
    let pattern = format!(
        r"(?i)([0-9][0-9.,]*\s?[kmb]?)\s+(?:{})\b",
        labels.join("|")
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_count(m.as_str()))
}
