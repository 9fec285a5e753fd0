//! Display-name sanitization for filesystem-safe track and album names.

/// Characters never allowed in a derived file name.
const FORBIDDEN: &[char] = &[
    '#', '%', '&', '{', '}', '\\', '/', '<', '>', '*', '?', '$', '!', '\'', '"', ':', '@', '+',
    '`', '|', '=',
];

/// Replacement applied instead of dropping the character outright.
fn substitution(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("and"),
        _ => None,
    }
}

/// Sanitizes a free-text display name for use inside a file name.
///
/// Every character from the forbidden set is removed, except characters with
/// a substitution (`&` becomes `and`). Always returns a string; the empty
/// string is a valid result.
pub fn sanitize_display_name(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if !FORBIDDEN.contains(&c) {
            out.push(c);
        } else if let Some(rep) = substitution(c) {
            out.push_str(rep);
        }
    }
    out
}
