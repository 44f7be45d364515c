//! Void element lookup
//!
//! Void elements have no content model: they never take children and are
//! never given a closing tag.

/// Tag names of the HTML void elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "menuitem", "meta",
    "param", "source", "track", "wbr",
];

/// Check whether `tag_name` names a void element (ASCII case-insensitive)
pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(tag_name))
}
