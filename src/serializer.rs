//! Token serialization
//!
//! This module turns structural tokens into HTML text. It provides:
//!
//! - [`capture_text`] - wraps loose text chunks into text tokens
//! - [`HtmlSerializer`] - the token-to-fragment state machine
//! - [`serialize_tokens`] / [`serialize_chunks`] - stream adapters driving it
//! - [`SerializerConfig`] - output options
//!
//! The serializer keeps a stack of open tags so that `ClosingTag` knows which
//! tag it closes. Void elements leave the stack at their `>` and never take a
//! `ClosingTag`. It never looks past the token it is processing, so memory is
//! bounded by nesting depth.
//!
//! ```rust,ignore
//! use html_stream::{serialize_tokens, stream_from_iter, HtmlToken, SerializerConfig};
//!
//! let tokens = stream_from_iter([
//!     HtmlToken::start("p"),
//!     HtmlToken::EndOfOpeningTag,
//!     HtmlToken::text("1 < 2"),
//!     HtmlToken::ClosingTag,
//! ]);
//! let html = serialize_tokens(tokens, &SerializerConfig::default()).into_string().await?;
//! assert_eq!(html, "<p>1 &lt; 2</p>");
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future;
use futures::ready;
use futures::stream::{FusedStream, Stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::escaping::escape_html_content;
use crate::stream::HtmlStream;
use crate::token::{Chunk, ChunkStream, HtmlFragment, HtmlToken, TokenStream};
use crate::void_elements::is_void_element;

/// Leading fragment of a full document
pub const DOCTYPE: &str = "<!doctype html>";

/// Output options for serialization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub(crate) doctype: bool,
}

impl SerializerConfig {
    /// Create a new serializer configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `<!doctype html>` before anything else
    pub fn with_doctype(mut self, enabled: bool) -> Self {
        self.doctype = enabled;
        self
    }

    pub fn doctype(&self) -> bool {
        self.doctype
    }
}

/// Token-to-HTML state machine for one serialization run
#[derive(Debug)]
pub struct HtmlSerializer {
    stack: Vec<String>,
    doctype_pending: bool,
}

impl HtmlSerializer {
    pub fn new(config: &SerializerConfig) -> Self {
        Self {
            stack: Vec::new(),
            doctype_pending: config.doctype(),
        }
    }

    /// Number of currently open tags
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The doctype fragment, if configured and not yet emitted
    pub fn take_doctype(&mut self) -> Option<HtmlFragment> {
        if std::mem::take(&mut self.doctype_pending) {
            Some(HtmlFragment::new(DOCTYPE))
        } else {
            None
        }
    }

    /// Serialize one token, returning `None` when it produces no text
    ///
    /// A void element is popped at its `>`, so a `ClosingTag` always closes
    /// the innermost non-void element.
    pub fn serialize_token(&mut self, token: HtmlToken) -> Result<Option<HtmlFragment>> {
        log::trace!(target: "html_stream::serializer", "serialize token: {:?}", token);

        let html = match token {
            HtmlToken::Text { text } => escape_html_content(&text).into_owned(),
            HtmlToken::StartOfOpeningTag { tag_name } => {
                let html = format!("<{}", tag_name);
                self.stack.push(tag_name);
                html
            }
            HtmlToken::Attribute { name, value } => {
                if value.is_empty() {
                    format!(" {}", name)
                } else {
                    format!(" {}=\"{}\"", name, escape_html_content(&value))
                }
            }
            HtmlToken::EndOfOpeningTag => {
                if self.stack.last().is_some_and(|name| is_void_element(name)) {
                    self.stack.pop();
                }
                ">".to_string()
            }
            HtmlToken::ClosingTag => {
                let name = self.stack.pop().ok_or_else(|| {
                    Error::invariant_static("closing tag with no open element")
                })?;
                format!("</{}>", name)
            }
        };

        Ok(if html.is_empty() {
            None
        } else {
            Some(HtmlFragment::new(html))
        })
    }

    /// Pass already-serialized HTML through
    pub fn serialize_html(&self, html: HtmlFragment) -> Option<HtmlFragment> {
        if html.is_empty() {
            None
        } else {
            Some(html)
        }
    }

    /// Serialize one construction chunk
    ///
    /// Loose text is handled like a text token.
    pub fn serialize_chunk(&mut self, chunk: Chunk) -> Result<Option<HtmlFragment>> {
        match chunk {
            Chunk::Token(token) => self.serialize_token(token),
            Chunk::Html(html) => Ok(self.serialize_html(html)),
            Chunk::Text(text) if text.is_empty() => Ok(None),
            Chunk::Text(text) => self.serialize_token(HtmlToken::Text { text }),
        }
    }
}

/// Wrap loose text chunks into text tokens, dropping empty ones
pub fn capture_text(chunks: ChunkStream) -> ChunkStream {
    chunks
        .try_filter_map(|chunk| {
            future::ready(Ok(match chunk {
                Chunk::Text(text) if text.is_empty() => None,
                Chunk::Text(text) => Some(Chunk::Token(HtmlToken::Text { text })),
                other => Some(other),
            }))
        })
        .boxed()
}

/// Stream adapter running an [`HtmlSerializer`] over construction chunks
struct SerializingStream {
    upstream: ChunkStream,
    serializer: HtmlSerializer,
    finished: bool,
}

impl Stream for SerializingStream {
    type Item = Result<HtmlFragment>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(doctype) = this.serializer.take_doctype() {
            return Poll::Ready(Some(Ok(doctype)));
        }
        loop {
            if this.finished {
                return Poll::Ready(None);
            }
            let chunk = match ready!(this.upstream.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(err)) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.finished = true;
                    return Poll::Ready(None);
                }
            };
            match this.serializer.serialize_chunk(chunk) {
                Ok(Some(fragment)) => return Poll::Ready(Some(Ok(fragment))),
                Ok(None) => continue,
                Err(err) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(err)));
                }
            }
        }
    }
}

impl FusedStream for SerializingStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

/// Serialize construction chunks into HTML fragments
pub fn serialize_chunks(chunks: ChunkStream, config: &SerializerConfig) -> HtmlStream {
    HtmlStream::new(
        SerializingStream {
            upstream: chunks,
            serializer: HtmlSerializer::new(config),
            finished: false,
        }
        .boxed(),
    )
}

/// Serialize structural tokens into HTML fragments
pub fn serialize_tokens(tokens: TokenStream, config: &SerializerConfig) -> HtmlStream {
    serialize_chunks(tokens.map_ok(Chunk::Token).boxed(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{stream_from_future, stream_from_iter};
    use pretty_assertions::assert_eq;

    async fn serialized(tokens: Vec<HtmlToken>) -> Result<Vec<String>> {
        serialize_tokens(stream_from_iter(tokens), &SerializerConfig::default())
            .map_ok(HtmlFragment::into_string)
            .try_collect()
            .await
    }

    #[tokio::test]
    async fn test_text_capturing() {
        let chunks = stream_from_iter([
            Chunk::Token(HtmlToken::start("a")),
            Chunk::Token(HtmlToken::EndOfOpeningTag),
            Chunk::Text("a".to_string()),
            Chunk::Token(HtmlToken::text("b")),
            Chunk::Text(String::new()),
            Chunk::Text("c".to_string()),
            Chunk::Token(HtmlToken::ClosingTag),
        ]);

        let captured: Vec<Chunk> = capture_text(chunks).try_collect().await.unwrap();
        assert_eq!(
            captured,
            vec![
                Chunk::Token(HtmlToken::start("a")),
                Chunk::Token(HtmlToken::EndOfOpeningTag),
                Chunk::Token(HtmlToken::text("a")),
                Chunk::Token(HtmlToken::text("b")),
                Chunk::Token(HtmlToken::text("c")),
                Chunk::Token(HtmlToken::ClosingTag),
            ]
        );
    }

    #[tokio::test]
    async fn test_html_serialization() {
        let fragments = serialized(vec![
            HtmlToken::start("a"),
            HtmlToken::attribute("class", "foo"),
            HtmlToken::attribute("autofocus", ""),
            HtmlToken::attribute("href", "https://example.com?a=1&b=2"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::text("a"),
            HtmlToken::text("b"),
            HtmlToken::text("c"),
            HtmlToken::ClosingTag,
        ])
        .await
        .unwrap();

        assert_eq!(
            fragments,
            vec![
                "<a",
                r#" class="foo""#,
                " autofocus",
                r#" href="https://example.com?a=1&amp;b=2""#,
                ">",
                "a",
                "b",
                "c",
                "</a>",
            ]
        );
    }

    #[tokio::test]
    async fn test_nested_elements_close_in_order() {
        let fragments = serialized(vec![
            HtmlToken::start("ul"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::start("li"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::start("b"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::text("x"),
            HtmlToken::ClosingTag,
            HtmlToken::ClosingTag,
            HtmlToken::ClosingTag,
        ])
        .await
        .unwrap();

        assert_eq!(fragments.concat(), "<ul><li><b>x</b></li></ul>");
    }

    #[tokio::test]
    async fn test_void_element_without_closing_token() {
        let fragments = serialized(vec![
            HtmlToken::start("p"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::start("br"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::text("after"),
            HtmlToken::ClosingTag,
        ])
        .await
        .unwrap();

        assert_eq!(fragments.concat(), "<p><br>after</p>");
    }

    #[tokio::test]
    async fn test_void_element_as_last_child() {
        let fragments = serialized(vec![
            HtmlToken::start("p"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::start("img"),
            HtmlToken::attribute("src", "x.png"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::ClosingTag,
        ])
        .await
        .unwrap();

        assert_eq!(fragments, vec!["<p", ">", "<img", r#" src="x.png""#, ">", "</p>"]);

        let html = serialize_tokens(
            stream_from_iter([
                HtmlToken::start("p"),
                HtmlToken::EndOfOpeningTag,
                HtmlToken::start("br"),
                HtmlToken::EndOfOpeningTag,
                HtmlToken::ClosingTag,
            ]),
            &SerializerConfig::default(),
        )
        .into_string()
        .await
        .unwrap();
        assert_eq!(html, "<p><br></p>");
    }

    #[tokio::test]
    async fn test_closing_a_void_element_underflows() {
        let result = serialized(vec![
            HtmlToken::start("br"),
            HtmlToken::EndOfOpeningTag,
            HtmlToken::ClosingTag,
        ])
        .await;
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn test_closing_with_empty_stack_is_fatal() {
        let mut stream = serialize_tokens(
            stream_from_iter([
                HtmlToken::start("a"),
                HtmlToken::EndOfOpeningTag,
                HtmlToken::ClosingTag,
                HtmlToken::ClosingTag,
                HtmlToken::text("never"),
            ]),
            &SerializerConfig::default(),
        );

        assert_eq!(stream.next().await.unwrap().unwrap(), "<a");
        assert_eq!(stream.next().await.unwrap().unwrap(), ">");
        assert_eq!(stream.next().await.unwrap().unwrap(), "</a>");
        assert!(matches!(
            stream.next().await,
            Some(Err(Error::InvariantViolation(_)))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_ends_serialization() {
        let tokens = crate::stream::concat_streams([
            stream_from_iter([HtmlToken::start("div"), HtmlToken::EndOfOpeningTag]),
            stream_from_future(async { Err(Error::usage_static("upstream failed")) }),
            stream_from_iter([HtmlToken::ClosingTag]),
        ])
        .boxed();

        let result = serialize_tokens(tokens, &SerializerConfig::default())
            .collect_fragments()
            .await;
        assert!(matches!(result, Err(Error::UsageError(_))));
    }

    #[tokio::test]
    async fn test_doctype_is_emitted_once() {
        let config = SerializerConfig::new().with_doctype(true);
        let html = serialize_tokens(
            stream_from_iter([
                HtmlToken::start("html"),
                HtmlToken::EndOfOpeningTag,
                HtmlToken::ClosingTag,
            ]),
            &config,
        )
        .into_string()
        .await
        .unwrap();

        assert_eq!(html, "<!doctype html><html></html>");
    }

    #[tokio::test]
    async fn test_identical_token_streams_serialize_identically() {
        let tokens = || {
            vec![
                HtmlToken::start("div"),
                HtmlToken::attribute("title", "\"quoted\" & 'single'"),
                HtmlToken::EndOfOpeningTag,
                HtmlToken::text("<&>"),
                HtmlToken::ClosingTag,
            ]
        };
        assert_eq!(serialized(tokens()).await.unwrap(), serialized(tokens()).await.unwrap());
    }

    #[test]
    fn test_serializer_tracks_depth() {
        let mut serializer = HtmlSerializer::new(&SerializerConfig::default());
        serializer.serialize_token(HtmlToken::start("div")).unwrap();
        serializer.serialize_token(HtmlToken::EndOfOpeningTag).unwrap();
        assert_eq!(serializer.depth(), 1);
        serializer.serialize_token(HtmlToken::start("input")).unwrap();
        assert_eq!(serializer.depth(), 2);
        serializer.serialize_token(HtmlToken::EndOfOpeningTag).unwrap();
        assert_eq!(serializer.depth(), 1);
        let html = serializer.serialize_html(HtmlFragment::new("<b>raw</b>"));
        assert_eq!(html.unwrap(), "<b>raw</b>");
        assert_eq!(serializer.depth(), 1);
        assert_eq!(
            serializer.serialize_token(HtmlToken::ClosingTag).unwrap().unwrap(),
            "</div>"
        );
        assert_eq!(serializer.depth(), 0);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SerializerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SerializerConfig::default());
        let config: SerializerConfig = serde_json::from_str(r#"{"doctype":true}"#).unwrap();
        assert!(config.doctype());
    }
}
