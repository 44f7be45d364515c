//! Structural tokens and serialized fragments
//!
//! [`HtmlToken`] is the interchange vocabulary between construction and
//! serialization. For each element a producer emits
//!
//! ```text
//! StartOfOpeningTag, Attribute*, EndOfOpeningTag, <children>*, ClosingTag
//! ```
//!
//! where void elements never emit `ClosingTag`. The serde encoding uses an
//! internal `kind` tag so token streams can be exchanged as JSON:
//!
//! ```json
//! {"kind":"startOfOpeningTag","tagName":"a"}
//! {"kind":"attribute","name":"href","value":"https://example.com"}
//! {"kind":"endOfOpeningTag"}
//! {"kind":"text","text":"link"}
//! {"kind":"closingTag"}
//! ```

use std::fmt;
use std::ops::Deref;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One unit of HTML structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HtmlToken {
    /// Text content, escaped by the serializer
    Text { text: String },
    /// `<tag`
    #[serde(rename_all = "camelCase")]
    StartOfOpeningTag { tag_name: String },
    /// An attribute of the currently opening tag; an empty value means a
    /// valueless attribute
    Attribute { name: String, value: String },
    /// `>`
    EndOfOpeningTag,
    /// `</tag>` for the innermost open element
    ClosingTag,
}

impl HtmlToken {
    pub fn text<S: Into<String>>(text: S) -> Self {
        HtmlToken::Text { text: text.into() }
    }

    pub fn start<S: Into<String>>(tag_name: S) -> Self {
        HtmlToken::StartOfOpeningTag {
            tag_name: tag_name.into(),
        }
    }

    pub fn attribute<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        HtmlToken::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A stream of structural tokens
pub type TokenStream = BoxStream<'static, Result<HtmlToken>>;

/// A piece of serialized HTML
///
/// Fragments are produced by the serializer or by trusted content. Their text
/// is emitted as-is; concatenating every fragment of a stream yields the
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HtmlFragment(String);

impl HtmlFragment {
    pub(crate) fn new<S: Into<String>>(html: S) -> Self {
        HtmlFragment(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for HtmlFragment {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HtmlFragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HtmlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for HtmlFragment {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for HtmlFragment {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<HtmlFragment> for String {
    fn from(fragment: HtmlFragment) -> Self {
        fragment.0
    }
}

/// An item of a construction stream, before serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Loose text from a child; escaped once captured into a text token
    Text(String),
    /// Structural token for the serializer
    Token(HtmlToken),
    /// Trusted HTML, emitted verbatim
    Html(HtmlFragment),
}

impl From<HtmlToken> for Chunk {
    fn from(token: HtmlToken) -> Self {
        Chunk::Token(token)
    }
}

/// A stream of construction chunks
pub type ChunkStream = BoxStream<'static, Result<Chunk>>;
