//! Streaming HTML construction and serialization
//!
//! This crate builds HTML as an asynchronous stream of fragments. Elements are
//! described with [`create_element`]; their attributes and children may be
//! plain values, futures, or streams, and the output starts flowing as soon as
//! the first piece is ready instead of waiting for the whole document.
//!
//! Untrusted text is escaped on the way out. Content that is already escaped
//! can be marked as trusted and is passed through verbatim.
//!
//! Custom producers can emit [`HtmlToken`]s directly and hand them to
//! [`serialize_tokens`], or nest them inside an element with
//! [`Child::tokens`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use html_stream::{attributes, create_element, AttributeValue, Child};
//!
//! # async fn example() -> html_stream::Result<()> {
//! let title = async { Ok(serde_json::Value::from("Greeting")) };
//! let page = create_element(
//!     "article",
//!     Some(attributes! { "title" => AttributeValue::deferred(title) }),
//!     vec![
//!         create_element("h1", None, vec!["Hello & welcome".into()])?.into(),
//!         Child::deferred(async { Ok("loaded later") }),
//!     ],
//! )?;
//!
//! assert_eq!(
//!     page.into_string().await?,
//!     r#"<article title="Greeting"><h1>Hello &amp; welcome</h1>loaded later</article>"#
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod escaping;
pub mod trust;
pub mod void_elements;
pub mod token;
pub mod stream;
pub mod attributes;
pub mod serializer;
pub mod element;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{Error, Result};
pub use escaping::escape_html_content;
pub use trust::PossiblyTrusted;
pub use void_elements::{is_void_element, VOID_ELEMENTS};
pub use token::{Chunk, ChunkStream, HtmlFragment, HtmlToken, TokenStream};
pub use stream::{
    concat_streams, stream_from_chunk, stream_from_deferred_stream, stream_from_future,
    stream_from_iter, Concat, HtmlStream,
};
pub use attributes::{AttributeValue, Attributes};
pub use serializer::{
    capture_text, serialize_chunks, serialize_tokens, HtmlSerializer, SerializerConfig, DOCTYPE,
};
pub use element::{create_element, Child, Tag};
