//! String helpers for name matching and display.

/// Normalizes a display name for fuzzy linking.
///
/// Lowercases and keeps only ASCII alphanumerics, so `"The Fall of Rome!"`
/// and `"the fall of rome"` both become `"thefallofrome"`. Non-ASCII letters
/// are dropped too.
///
/// # Examples
///
/// ```
/// use storyteller_domain::common::sanitize_name;
///
/// assert_eq!(sanitize_name("Battle of Hastings (1066)"), "battleofhastings1066");
/// assert_eq!(sanitize_name("  -- "), "");
/// ```
pub fn sanitize_name(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Returns `None` for empty or whitespace-only strings, otherwise the trimmed value.
///
/// # Examples
///
/// ```
/// use storyteller_domain::common::none_if_blank;
///
/// assert_eq!(none_if_blank("  Tavern "), Some("Tavern"));
/// assert_eq!(none_if_blank("   "), None);
/// ```
pub fn none_if_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Truncates to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
