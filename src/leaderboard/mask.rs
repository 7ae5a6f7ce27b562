//! Username redaction for public boards.
//!
//! Lengths and slices are measured in Unicode scalar values (`char`), so multi-byte
//! names are never split inside a code point.

/// Shown when there is no name at all.
pub const EMPTY_PLACEHOLDER: &str = "****";

/// Names this short are shown as-is.
const MAX_UNMASKED_CHARS: usize = 4;

/// Keep the first and last two characters, replace the middle with `***`.
pub fn mask_username(username: Option<&str>) -> String {
    let name = match username {
        Some(n) if !n.is_empty() => n,
        _ => return EMPTY_PLACEHOLDER.to_string(),
    };

    let len = name.chars().count();
    if len <= MAX_UNMASKED_CHARS {
        return name.to_string();
    }

    let head: String = name.chars().take(2).collect();
    let tail: String = name.chars().skip(len - 2).collect();
    format!("{head}***{tail}")
}
