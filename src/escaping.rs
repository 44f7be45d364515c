//! HTML escaping for text content and attribute values

use std::borrow::Cow;

/// Escape the HTML special characters in `input`
///
/// `&`, `<`, `>`, `"` and `'` are replaced by their HTML5 named character
/// references. `'` uses `&apos;` rather than the numeric `&#x27;` so all five
/// replacements are named references. Input without special characters is
/// returned borrowed.
///
/// Escaping is not idempotent: `&amp;` becomes `&amp;amp;`. Apply it exactly
/// once to untrusted text.
pub fn escape_html_content(input: &str) -> Cow<str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + input.len() / 4);
    for ch in input.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }

    Cow::Owned(result)
}
