//! Offsets in persisted drafts count UTF-16 code units, not bytes or chars.

/// Length of `s` in UTF-16 code units
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Byte index for a UTF-16 offset. Offsets past the end clamp to `s.len()`;
/// an offset inside a surrogate pair rounds up to the next char.
pub fn byte_index(s: &str, offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        if units >= offset {
            return idx;
        }
        units += ch.len_utf16();
    }
    s.len()
}

/// Substring between two UTF-16 offsets
pub fn slice(s: &str, from: usize, to: usize) -> &str {
    let start = byte_index(s, from);
    let end = byte_index(s, to).max(start);
    &s[start..end]
}
