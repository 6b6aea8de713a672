/// Maximum description length shown in human-readable listings.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Case-insensitive substring test. `needle_lower` must already be
/// lowercased so callers can hoist that out of their loops.
pub fn contains_lowercase(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Cut `text` to at most `max_chars` characters, appending `...` when
/// anything was removed.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
