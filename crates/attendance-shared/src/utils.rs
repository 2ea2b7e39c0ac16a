//! Utility functions

/// Normalise a raw card read into the canonical card id.
///
/// Readers emit the UID with trailing line terminators or NUL padding and in
/// either letter case; the stored form has none of those and is upper-case.
/// Returns `None` when nothing is left.
pub fn normalize_card_id(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\0'))
        .collect::<String>()
        .trim()
        .to_uppercase();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
