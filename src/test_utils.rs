//! Helpers for checking serialized output with a real HTML parser

use dom_query::Document;

/// Parse and re-serialize `html`, trimming surrounding whitespace
pub fn normalize_html(html: &str) -> String {
    Document::from(html).html().trim().to_string()
}

/// Text content of the parsed document body, with entities decoded
pub fn extract_text(html: &str) -> String {
    Document::from(html).select("body").text().to_string()
}

/// Decoded value of attribute `name` on the first match of `selector`
pub fn attribute_of(html: &str, selector: &str, name: &str) -> Option<String> {
    Document::from(html)
        .select(selector)
        .attr(name)
        .map(|value| value.to_string())
}
