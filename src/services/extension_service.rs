/// Characters that are illegal in a filename on at least one supported
/// filesystem (the Windows set, a superset of the Unix one). ASCII control
/// characters are rejected separately.
const INVALID_FILENAME_CHARS: &[char] = &['"', '*', '/', ':', '<', '>', '?', '\\', '|'];

/// Canonicalizes a user-typed extension filter: trims surrounding
/// whitespace, drops characters illegal in a filename, and prepends `.` if
/// missing. Case is preserved. Empty or all-invalid input comes back as
/// `"."`, a degenerate filter that is accepted as-is.
pub fn normalize(raw: &str) -> String {
    let mut cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !INVALID_FILENAME_CHARS.contains(c))
        .collect();
    if !cleaned.starts_with('.') {
        cleaned.insert(0, '.');
    }
    cleaned
}
