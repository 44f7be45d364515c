//! Element and fragment construction
//!
//! [`create_element`] assembles an element from its tag, attributes and
//! children into an [`HtmlStream`]. Children may be plain strings, futures,
//! string streams, nested elements, token streams from custom producers, or
//! lists of any of these. Output starts as soon as the first piece is
//! available; each child is resolved in document order when the consumer
//! reaches it.
//!
//! # Pipeline
//!
//! ```text
//! [<tag] [attributes] [>] child child ... [</tag>]   (concatenated chunks)
//!   -> capture_text    loose text becomes text tokens
//!   -> serializer      tokens become escaped HTML; trusted HTML passes through
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use html_stream::{attributes, create_element, Child, Tag};
//!
//! let list = create_element("ul", None, vec![
//!     create_element("li", None, vec!["first".into()])?.into(),
//!     Child::deferred(async { Ok("second") }),
//! ])?;
//! let page = create_element("main", Some(attributes! { "id" => "root" }), vec![list.into()])?;
//! assert_eq!(
//!     page.into_string().await?,
//!     r#"<main id="root"><ul><li>first</li>second</ul></main>"#
//! );
//! ```

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use futures::FutureExt;

use crate::attributes::{attributes_to_chunks, check_attributes, Attributes};
use crate::error::{Error, Result};
use crate::serializer::{capture_text, serialize_chunks, SerializerConfig};
use crate::stream::{concat_streams, stream_from_chunk, stream_from_deferred_stream, HtmlStream};
use crate::token::{Chunk, ChunkStream, HtmlFragment, HtmlToken, TokenStream};
use crate::trust::PossiblyTrusted;
use crate::void_elements::is_void_element;

/// What `create_element` builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Children without a wrapping element
    Fragment,
    /// An intrinsic element such as `div`
    Element(String),
}

impl From<&str> for Tag {
    fn from(tag_name: &str) -> Self {
        Tag::Element(tag_name.to_string())
    }
}

impl From<String> for Tag {
    fn from(tag_name: String) -> Self {
        Tag::Element(tag_name)
    }
}

/// Content of an element or fragment
pub enum Child {
    /// Inline text; always escaped
    Text(String),
    /// A child available after one await
    Deferred(PossiblyTrusted<BoxFuture<'static, Result<Child>>>),
    /// Text arriving in chunks, each emitted as it arrives
    Chunks(PossiblyTrusted<BoxStream<'static, Result<String>>>),
    /// A constructed element; already serialized, emitted verbatim
    Html(HtmlStream),
    /// Structural tokens from a custom producer
    Tokens(TokenStream),
    /// Several children in order
    List(Vec<Child>),
}

impl Child {
    /// A child resolved from `fut`
    pub fn deferred<F, C>(fut: F) -> Self
    where
        F: Future<Output = Result<C>> + Send + 'static,
        C: Into<Child>,
    {
        Child::Deferred(PossiblyTrusted::untrusted(
            fut.map(|result| result.map(Into::into)).boxed(),
        ))
    }

    /// A child made of streamed text chunks
    pub fn chunks<S, C>(chunks: S) -> Self
    where
        S: Stream<Item = Result<C>> + Send + 'static,
        C: Into<String> + 'static,
    {
        Child::Chunks(PossiblyTrusted::untrusted(
            chunks.map_ok(Into::into).boxed(),
        ))
    }

    /// A child made of structural tokens
    pub fn tokens<S>(tokens: S) -> Self
    where
        S: Stream<Item = Result<HtmlToken>> + Send + 'static,
    {
        Child::Tokens(tokens.boxed())
    }

    /// Mark deferred or streamed text as already escaped
    ///
    /// Inline text stays untrusted.
    pub fn trusted(self) -> Self {
        match self {
            Child::Deferred(deferred) => Child::Deferred(deferred.trust()),
            Child::Chunks(chunks) => Child::Chunks(chunks.trust()),
            other => other,
        }
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Child::Deferred(deferred) => f
                .debug_struct("Deferred")
                .field("trusted", &deferred.trusted)
                .finish_non_exhaustive(),
            Child::Chunks(chunks) => f
                .debug_struct("Chunks")
                .field("trusted", &chunks.trusted)
                .finish_non_exhaustive(),
            Child::Html(html) => f.debug_tuple("Html").field(html).finish(),
            Child::Tokens(_) => f.debug_struct("Tokens").finish_non_exhaustive(),
            Child::List(children) => f.debug_tuple("List").field(children).finish(),
        }
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<HtmlStream> for Child {
    fn from(html: HtmlStream) -> Self {
        Child::Html(html)
    }
}

impl From<Vec<Child>> for Child {
    fn from(children: Vec<Child>) -> Self {
        Child::List(children)
    }
}

/// Tag names start with an ASCII letter; the rest may be anything that
/// cannot end the tag, so custom element names like `my-el.x` or `x-ü` pass
fn is_valid_tag_name(tag_name: &str) -> bool {
    let mut chars = tag_name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| !c.is_whitespace() && !c.is_control() && !"/<>=\"'".contains(c))
}

fn text_chunk(text: String, trusted: bool) -> Chunk {
    if trusted {
        Chunk::Html(HtmlFragment::new(text))
    } else {
        Chunk::Text(text)
    }
}

/// Normalize a child into construction chunks
///
/// `trusted` is inherited from an enclosing trusted deferred value.
fn child_to_chunks(child: Child, trusted: bool) -> ChunkStream {
    match child {
        Child::Text(text) => stream_from_chunk(text_chunk(text, trusted)),
        Child::Deferred(deferred) => {
            let (fut, own_trust) = deferred.into_parts();
            let trusted = trusted || own_trust;
            stream_from_deferred_stream(async move {
                let child = fut.await?;
                Ok(child_to_chunks(child, trusted))
            })
        }
        Child::Chunks(chunks) => {
            let (chunks, own_trust) = chunks.into_parts();
            let trusted = trusted || own_trust;
            chunks
                .map_ok(move |text| text_chunk(text, trusted))
                .boxed()
        }
        Child::Html(html) => html.map_ok(Chunk::Html).boxed(),
        Child::Tokens(tokens) => tokens.map_ok(Chunk::Token).boxed(),
        Child::List(children) => concat_streams(
            children
                .into_iter()
                .map(|child| child_to_chunks(child, trusted)),
        )
        .boxed(),
    }
}

/// `<tag`, the attributes, and `>`
///
/// Attribute names and literal values are checked before `<tag` is
/// produced, so an invalid attribute fails the stream before any output.
fn opening_tag(tag_name: String, attributes: Attributes) -> ChunkStream {
    stream_from_deferred_stream(async move {
        check_attributes(&attributes)?;
        Ok(concat_streams([
            stream_from_chunk(Chunk::Token(HtmlToken::start(tag_name))),
            attributes_to_chunks(attributes),
            stream_from_chunk(Chunk::Token(HtmlToken::EndOfOpeningTag)),
        ])
        .boxed())
    })
}

/// Create an element or fragment
///
/// Fragments take no attributes; void elements take no children. Either
/// mistake is reported here as [`Error::UsageError`]. Invalid attribute
/// names and values, and failures of deferred children, are reported as the
/// stream's terminal error.
pub fn create_element<T>(
    tag: T,
    attributes: Option<Attributes>,
    children: Vec<Child>,
) -> Result<HtmlStream>
where
    T: Into<Tag>,
{
    let tag = tag.into();
    log::trace!(
        target: "html_stream::element",
        "create {:?} with {} children",
        tag,
        children.len()
    );

    let mut parts: Vec<ChunkStream> = Vec::with_capacity(children.len() + 2);
    let closing = match tag {
        Tag::Fragment => {
            if attributes.is_some() {
                return Err(Error::usage_static("fragments cannot have attributes"));
            }
            None
        }
        Tag::Element(tag_name) => {
            if !is_valid_tag_name(&tag_name) {
                return Err(Error::usage_owned(format!(
                    "`{}` is not a valid element tag name",
                    tag_name
                )));
            }
            let void = is_void_element(&tag_name);
            if void && !children.is_empty() {
                return Err(Error::usage_owned(format!(
                    "void element `{}` cannot have children",
                    tag_name
                )));
            }
            parts.push(opening_tag(tag_name, attributes.unwrap_or_default()));
            (!void).then(|| stream_from_chunk(Chunk::Token(HtmlToken::ClosingTag)))
        }
    };

    parts.extend(children.into_iter().map(|child| child_to_chunks(child, false)));
    parts.extend(closing);

    let chunks = capture_text(concat_streams(parts).boxed());
    Ok(serialize_chunks(chunks, &SerializerConfig::default()))
}
