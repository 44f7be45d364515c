//! Stream primitives for incremental HTML output
//!
//! This module provides the concatenation primitive that every composed
//! stream in this crate is built from, a few constructors for turning values,
//! iterators and futures into streams, and [`HtmlStream`], the serialized
//! output type.
//!
//! All streams are pull-driven: nothing is resolved or buffered ahead of the
//! consumer's request, and a stream that yields an `Err` yields nothing
//! afterwards.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::io::{AsyncWrite, AsyncWriteExt};
use futures::stream::{self, BoxStream, FusedStream, Stream, StreamExt, TryStreamExt};
use futures::{future, ready};

use crate::error::Result;
use crate::serializer::{SerializerConfig, DOCTYPE};
use crate::token::HtmlFragment;

/// Sequential concatenation of fallible streams
///
/// Yields every item of the first stream, then every item of the second, and
/// so on. Only the front stream is polled, and only when this stream is. The
/// first `Err` from any stream is yielded and the remaining streams are
/// dropped without being polled.
pub struct Concat<T> {
    streams: VecDeque<BoxStream<'static, Result<T>>>,
    finished: bool,
}

impl<T> Concat<T> {
    pub fn new<I>(streams: I) -> Self
    where
        I: IntoIterator<Item = BoxStream<'static, Result<T>>>,
    {
        Self {
            streams: streams.into_iter().collect(),
            finished: false,
        }
    }

    /// Number of streams not yet drained
    pub fn remaining(&self) -> usize {
        self.streams.len()
    }
}

impl<T> Stream for Concat<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.finished {
                return Poll::Ready(None);
            }
            let Some(front) = this.streams.front_mut() else {
                this.finished = true;
                return Poll::Ready(None);
            };
            match ready!(front.as_mut().poll_next(cx)) {
                Some(Ok(item)) => return Poll::Ready(Some(Ok(item))),
                Some(Err(err)) => {
                    this.streams.clear();
                    this.finished = true;
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.streams.pop_front();
                }
            }
        }
    }
}

impl<T> FusedStream for Concat<T> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl<T> fmt::Debug for Concat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Concat")
            .field("remaining", &self.streams.len())
            .field("finished", &self.finished)
            .finish()
    }
}

/// Concatenate `streams` in order
pub fn concat_streams<T, I>(streams: I) -> Concat<T>
where
    I: IntoIterator<Item = BoxStream<'static, Result<T>>>,
{
    Concat::new(streams)
}

/// A stream yielding exactly `item`
pub fn stream_from_chunk<T>(item: T) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
{
    stream::once(future::ready(Ok(item))).boxed()
}

/// A stream yielding the items of `iter`
pub fn stream_from_iter<I>(iter: I) -> BoxStream<'static, Result<I::Item>>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    stream::iter(iter.into_iter().map(Ok)).boxed()
}

/// A stream yielding the output of `fut`, polled on first demand
pub fn stream_from_future<T, F>(fut: F) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    stream::once(fut).boxed()
}

/// A stream yielding the items of the stream `fut` resolves to
pub fn stream_from_deferred_stream<T, F>(fut: F) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    F: Future<Output = Result<BoxStream<'static, Result<T>>>> + Send + 'static,
{
    stream::once(fut).try_flatten().boxed()
}

/// End `stream` right after the first `Err` it yields
pub fn stop_after_error<T>(stream: BoxStream<'static, Result<T>>) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
{
    stream
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}

/// Serialized HTML output
///
/// Produced by [`create_element`](crate::create_element) and
/// [`serialize_tokens`](crate::serialize_tokens). Its fragments are already
/// escaped, so passing it as a child of another element emits it verbatim.
pub struct HtmlStream {
    inner: BoxStream<'static, Result<HtmlFragment>>,
}

impl HtmlStream {
    pub(crate) fn new(inner: BoxStream<'static, Result<HtmlFragment>>) -> Self {
        Self { inner }
    }

    /// A stream with no fragments
    pub fn empty() -> Self {
        Self::new(stream::empty().boxed())
    }

    /// Collect every fragment, failing with the stream's terminal error
    pub async fn collect_fragments(self) -> Result<Vec<HtmlFragment>> {
        self.try_collect().await
    }

    /// Concatenate every fragment into one string
    pub async fn into_string(self) -> Result<String> {
        self.try_fold(String::new(), |mut html, fragment| {
            html.push_str(&fragment);
            future::ready(Ok(html))
        })
        .await
    }

    /// Write fragments to `writer` as they become available
    ///
    /// On error, the fragments already written must be discarded by the
    /// caller.
    pub async fn write_to<W>(mut self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(fragment) = self.try_next().await? {
            writer.write_all(fragment.as_bytes()).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    /// Prepend the doctype when `config` asks for one
    pub fn into_document(self, config: &SerializerConfig) -> HtmlStream {
        if !config.doctype() {
            return self;
        }
        let doctype = stream_from_chunk(HtmlFragment::new(DOCTYPE));
        HtmlStream::new(concat_streams([doctype, self.inner]).boxed())
    }
}

impl Stream for HtmlStream {
    type Item = Result<HtmlFragment>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for HtmlStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlStream").finish_non_exhaustive()
    }
}
