/// Remove alignment gap characters (`-`) from a sequence.
pub fn sanitize_sequence(sequence: Option<&str>) -> Option<String> {
    sequence.map(|s| s.replace('-', ""))
}

/// Trim surrounding whitespace, treating blank cells as missing.
pub fn non_empty(cell: &str) -> Option<&str> {
    let trimmed = cell.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Cut a message down to `max_len` characters, ending it with `...` when shortened.
///
/// A `max_len` too small to hold the ellipsis keeps only the first characters.
pub fn truncate_message(message: &str, max_len: usize) -> String {
    if message.chars().count() <= max_len {
        return message.to_owned();
    }

    if max_len < 3 {
        return message.chars().take(max_len).collect();
    }

    let keep = max_len - 3;
    let mut res = message.chars().take(keep).collect::<String>();
    res.push_str("...");
    res
}
