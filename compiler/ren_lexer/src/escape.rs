//! Escape Sequence Processing
//!
//! Recognized escapes in text literals: `\n`, `\t`, `\\`, `\"`.

/// Resolve a single escape character to its replacement.
#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    }
}

/// Process escapes in the body of a text literal (quotes already stripped).
///
/// Returns the first unrecognized escape character on failure.
pub(crate) fn unescape_text(s: &str) -> Result<String, char> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            let esc = chars.next().unwrap_or('\\');
            result.push(resolve_escape(esc).ok_or(esc)?);
        } else {
            result.push(c);
        }
    }

    Ok(result)
}
