//! Attribute validation and encoding
//!
//! Attribute values are strings or booleans, either literal or deferred:
//!
//! - a literal [`serde_json::Value`] (strings and booleans are legal, anything
//!   else fails with [`Error::AttributeValueTypeError`])
//! - a future resolving to such a value
//! - a stream of string chunks, buffered and emitted as one value
//!
//! Deferred values may be marked trusted, in which case their text is
//! emitted without escaping. Names are checked against the character classes
//! the HTML syntax forbids in attribute names.
//!
//! ```rust,ignore
//! use html_stream::{attributes, AttributeValue};
//!
//! let attrs = attributes! {
//!     "id" => "main",
//!     "autofocus" => true,
//!     "href" => AttributeValue::deferred(async { Ok("https://example.com") }),
//! };
//! ```

use std::borrow::Cow;
use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use futures::{future, FutureExt};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::escaping::escape_html_content;
use crate::stream::stop_after_error;
use crate::token::{Chunk, ChunkStream, HtmlFragment, HtmlToken, TokenStream};
use crate::trust::PossiblyTrusted;

// Attribute names must consist of one or more characters other than controls,
// U+0020 SPACE, U+0022 ("), U+0027 ('), U+003E (>), U+002F (/), U+003D (=),
// and noncharacters.
// https://html.spec.whatwg.org/multipage/syntax.html#attributes-2

/// C0 controls and U+007F DELETE through U+009F APPLICATION PROGRAM COMMAND
static CONTROL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{00}-\x{1F}\x{7F}-\x{9F}]").expect("Invalid control regex"));

static SPECIAL_CHARACTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[ "'>/=]"#).expect("Invalid special character regex"));

/// U+FDD0..U+FDEF and the last two code points of every plane
static NONCHARACTER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[\x{FDD0}-\x{FDEF}\x{FFFE}\x{FFFF}",
        r"\x{1FFFE}\x{1FFFF}\x{2FFFE}\x{2FFFF}\x{3FFFE}\x{3FFFF}\x{4FFFE}\x{4FFFF}",
        r"\x{5FFFE}\x{5FFFF}\x{6FFFE}\x{6FFFF}\x{7FFFE}\x{7FFFF}\x{8FFFE}\x{8FFFF}",
        r"\x{9FFFE}\x{9FFFF}\x{AFFFE}\x{AFFFF}\x{BFFFE}\x{BFFFF}\x{CFFFE}\x{CFFFF}",
        r"\x{DFFFE}\x{DFFFF}\x{EFFFE}\x{EFFFF}\x{FFFFE}\x{FFFFF}\x{10FFFE}\x{10FFFF}]",
    ))
    .expect("Invalid noncharacter regex")
});

/// A possibly deferred attribute value
pub enum AttributeValue {
    /// Inline value; always escaped
    Literal(Value),
    /// Value resolved by a single await
    Deferred(PossiblyTrusted<BoxFuture<'static, Result<Value>>>),
    /// String chunks, concatenated before emission
    Chunks(PossiblyTrusted<BoxStream<'static, Result<String>>>),
}

impl AttributeValue {
    /// Defer the value until `fut` resolves
    pub fn deferred<F, V>(fut: F) -> Self
    where
        F: Future<Output = Result<V>> + Send + 'static,
        V: Into<Value>,
    {
        AttributeValue::Deferred(PossiblyTrusted::untrusted(
            fut.map(|result| result.map(Into::into)).boxed(),
        ))
    }

    /// Build the value from string chunks
    pub fn chunks<S, C>(chunks: S) -> Self
    where
        S: Stream<Item = Result<C>> + Send + 'static,
        C: Into<String> + 'static,
    {
        AttributeValue::Chunks(PossiblyTrusted::untrusted(
            chunks.map_ok(Into::into).boxed(),
        ))
    }

    /// Mark a deferred value as already escaped
    ///
    /// Literal values stay untrusted.
    pub fn trusted(self) -> Self {
        match self {
            AttributeValue::Deferred(value) => AttributeValue::Deferred(value.trust()),
            AttributeValue::Chunks(value) => AttributeValue::Chunks(value.trust()),
            literal => literal,
        }
    }

    pub fn is_trusted(&self) -> bool {
        match self {
            AttributeValue::Literal(_) => false,
            AttributeValue::Deferred(value) => value.trusted,
            AttributeValue::Chunks(value) => value.trusted,
        }
    }
}

impl std::fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            AttributeValue::Deferred(value) => f
                .debug_struct("Deferred")
                .field("trusted", &value.trusted)
                .finish_non_exhaustive(),
            AttributeValue::Chunks(value) => f
                .debug_struct("Chunks")
                .field("trusted", &value.trusted)
                .finish_non_exhaustive(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Literal(Value::String(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Literal(Value::Bool(value))
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::Literal(value)
    }
}

/// Attributes in emission order
pub type Attributes = IndexMap<String, AttributeValue>;

/// Build an [`Attributes`] map
///
/// ```rust,ignore
/// let attrs = attributes! { "class" => "card", "hidden" => false };
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        {
            let mut attributes = $crate::Attributes::new();
            $(
                attributes.insert(
                    ::std::string::String::from($name),
                    $crate::AttributeValue::from($value),
                );
            )+
            attributes
        }
    };
}

/// Check a name against the HTML attribute name syntax
pub fn is_legal_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !CONTROL_PATTERN.is_match(name)
        && !SPECIAL_CHARACTER_PATTERN.is_match(name)
        && !NONCHARACTER_PATTERN.is_match(name)
}

pub fn validate_attribute_name(name: &str) -> Result<()> {
    if is_legal_attribute_name(name) {
        Ok(())
    } else {
        log::debug!("rejecting attribute name {:?}", name);
        Err(Error::AttributeNameError(name.to_string()))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_value_type(name: &str, value: &Value) -> Error {
    let observed = json_type_name(value);
    log::debug!("rejecting {} value for attribute {:?}", observed, name);
    Error::attribute_value_type(name, observed)
}

/// Encode one resolved attribute as HTML text
///
/// Strings produce ` name="value"`, escaped unless `trusted`; `true`
/// produces ` name`; `false` produces nothing.
pub fn stringify_attribute(name: &str, value: &Value, trusted: bool) -> Result<Option<String>> {
    validate_attribute_name(name)?;
    match value {
        Value::String(text) => {
            let text = if trusted {
                Cow::Borrowed(text.as_str())
            } else {
                escape_html_content(text)
            };
            Ok(Some(format!(" {}=\"{}\"", name, text)))
        }
        Value::Bool(true) => Ok(Some(format!(" {}", name))),
        Value::Bool(false) => Ok(None),
        other => Err(invalid_value_type(name, other)),
    }
}

/// Encode one resolved attribute as a structural token
///
/// `true` becomes a token with an empty value; `false` produces nothing.
pub fn attribute_token(name: &str, value: &Value) -> Result<Option<HtmlToken>> {
    validate_attribute_name(name)?;
    match value {
        Value::String(text) => Ok(Some(HtmlToken::attribute(name, text.as_str()))),
        Value::Bool(true) => Ok(Some(HtmlToken::attribute(name, ""))),
        Value::Bool(false) => Ok(None),
        other => Err(invalid_value_type(name, other)),
    }
}

/// Check every name and every literal value without resolving deferred ones
pub(crate) fn check_attributes(attributes: &Attributes) -> Result<()> {
    for (name, value) in attributes {
        validate_attribute_name(name)?;
        if let AttributeValue::Literal(literal) = value {
            if !matches!(literal, Value::String(_) | Value::Bool(_)) {
                return Err(invalid_value_type(name, literal));
            }
        }
    }
    Ok(())
}

/// Resolve a value, awaiting it or draining its chunks
///
/// The trust flag is taken before resolution starts.
pub async fn resolve_attribute_value(value: AttributeValue) -> Result<PossiblyTrusted<Value>> {
    match value {
        AttributeValue::Literal(literal) => Ok(PossiblyTrusted::untrusted(literal)),
        AttributeValue::Deferred(deferred) => {
            let (fut, trusted) = deferred.into_parts();
            let value = fut.await?;
            Ok(PossiblyTrusted { value, trusted })
        }
        AttributeValue::Chunks(chunks) => {
            let (chunks, trusted) = chunks.into_parts();
            let buffered = chunks
                .try_fold(String::new(), |mut buffered, chunk| {
                    buffered.push_str(&chunk);
                    future::ready(Ok(buffered))
                })
                .await?;
            Ok(PossiblyTrusted {
                value: Value::String(buffered),
                trusted,
            })
        }
    }
}

/// Resolve attributes in order into serialized ` name="value"` chunks
pub fn attributes_to_chunks(attributes: Attributes) -> ChunkStream {
    let chunks = stream::iter(attributes)
        .then(|(name, value)| async move {
            let (value, trusted) = resolve_attribute_value(value).await?.into_parts();
            let html = stringify_attribute(&name, &value, trusted)?;
            Ok(html.map(|html| Chunk::Html(HtmlFragment::new(html))))
        })
        .try_filter_map(|chunk| future::ready(Ok(chunk)))
        .boxed();
    stop_after_error(chunks)
}

/// Resolve attributes in order into attribute tokens
///
/// Tokens carry no trust flag: trusted values are escaped by the serializer
/// like any other.
pub fn attributes_to_token_stream(attributes: Attributes) -> TokenStream {
    let tokens = stream::iter(attributes)
        .then(|(name, value)| async move {
            let value = resolve_attribute_value(value).await?.value;
            attribute_token(&name, &value)
        })
        .try_filter_map(|token| future::ready(Ok(token)))
        .boxed();
    stop_after_error(tokens)
}
