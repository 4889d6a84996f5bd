//! Chunk sources backing a [`Web3File`](crate::Web3File).
//!
//! A [`Content`] is an ordered stream of byte chunks. It comes in two kinds
//! which behave detectably differently when consumed more than once:
//!
//! - **repeatable**: a fixed list of chunks already in memory. Every clone
//!   and every [`Content::restart`] starts again from the first chunk. Built
//!   by [`Content::chunks`] and by the `from_bytes`/`from_text`/`from_chunks`
//!   factories.
//! - **single-pass**: an adapted stream. All clones share the one underlying
//!   stream, so draining any of them drains all of them. Built by
//!   [`Content::stream`] and by every stream, reader, blob and file factory.
//!
//! Clones of a single-pass source may be polled from several tasks at once.
//! Each chunk goes to exactly one of them, and every waiting task is woken
//! whenever the shared stream yields a chunk or ends.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Waker};

use async_stream::stream;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::{BoxStream, Fuse, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Boxed stream of byte chunks, the common currency between adapters.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Upper bound for a single chunk read from an [`AsyncRead`].
pub const READ_BUFFER_CAPACITY: usize = 64 * 1024;

/// Spare capacity below which the read buffer is topped up again.
const READ_BUFFER_LOW_WATER: usize = 4 * 1024;

/// Adapts a reader into a chunk stream. The stream ends at EOF or right
/// after yielding the first read error.
///
/// Chunks are split off one shared buffer, so short reads share an
/// allocation instead of each holding a full read buffer.
pub fn reader_stream<R>(reader: R) -> ByteStream
where
    R: AsyncRead + Send + 'static,
{
    Box::pin(stream! {
        let mut reader = Box::pin(reader);
        let mut buffer = BytesMut::new();
        let mut total = 0;
        loop {
            if buffer.capacity() < READ_BUFFER_LOW_WATER {
                buffer.reserve(READ_BUFFER_CAPACITY);
            }
            let read = reader
                .read_buf(&mut (&mut buffer).limit(READ_BUFFER_CAPACITY))
                .await;
            match read {
                Ok(0) => break,
                Ok(read) => {
                    total += read;
                    yield Ok(buffer.split().freeze());
                }
                Err(e) => {
                    log::debug!("Reader failed after {} bytes: {}", total, e);
                    yield Err(e);
                    break;
                }
            }
        }
        log::trace!("{} bytes has been read", total);
    })
}

#[derive(Clone)]
pub struct Content {
    source: Source,
}

#[derive(Clone)]
enum Source {
    Chunks { chunks: Arc<[Bytes]>, position: usize },
    Stream(Arc<Mutex<Shared>>),
}

/// A single-pass stream together with every task waiting on it.
///
/// The inner stream only remembers the last waker it was polled with, so
/// the others are kept here and woken on each chunk or at the end.
struct Shared {
    stream: Fuse<ByteStream>,
    waiters: Vec<Waker>,
}

impl Shared {
    fn poll_next(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<io::Result<Bytes>>> {
        match self.stream.poll_next_unpin(cx) {
            Poll::Ready(item) => {
                for waiter in self.waiters.drain(..) {
                    waiter.wake();
                }
                Poll::Ready(item)
            }
            Poll::Pending => {
                if !self.waiters.iter().any(|w| w.will_wake(cx.waker())) {
                    self.waiters.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl Content {
    /// Repeatable source over a fixed list of chunks.
    pub fn chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks: Arc<[Bytes]> = chunks.into_iter().map(Into::into).collect();
        Self {
            source: Source::Chunks {
                chunks,
                position: 0,
            },
        }
    }

    /// Single-pass source adapting an arbitrary chunk stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            source: Source::Stream(Arc::new(Mutex::new(Shared {
                stream: stream.boxed().fuse(),
                waiters: Vec::new(),
            }))),
        }
    }

    pub fn is_repeatable(&self) -> bool {
        matches!(self.source, Source::Chunks { .. })
    }

    /// A cursor over the same source, positioned at its start.
    ///
    /// For single-pass sources "start" is wherever the shared stream
    /// currently is.
    pub fn restart(&self) -> Self {
        match &self.source {
            Source::Chunks { chunks, .. } => Self {
                source: Source::Chunks {
                    chunks: Arc::clone(chunks),
                    position: 0,
                },
            },
            Source::Stream(shared) => Self {
                source: Source::Stream(Arc::clone(shared)),
            },
        }
    }

    /// Whether two cursors read from the same underlying source.
    pub fn same_source(&self, other: &Content) -> bool {
        match (&self.source, &other.source) {
            (
                Source::Chunks { chunks: left, .. },
                Source::Chunks { chunks: right, .. },
            ) => Arc::ptr_eq(left, right),
            (Source::Stream(left), Source::Stream(right)) => {
                Arc::ptr_eq(left, right)
            }
            _ => false,
        }
    }
}

impl<B: Into<Bytes>> From<Vec<B>> for Content {
    fn from(chunks: Vec<B>) -> Self {
        Content::chunks(chunks)
    }
}

impl Stream for Content {
    type Item = io::Result<Bytes>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        match &mut self.source {
            Source::Chunks { chunks, position } => {
                let next = chunks.get(*position).cloned();
                if next.is_some() {
                    *position += 1;
                }
                Poll::Ready(next.map(Ok))
            }
            Source::Stream(shared) => {
                // the lock only lives for this poll
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .poll_next(cx)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.source {
            Source::Chunks { chunks, position } => {
                let remaining = chunks.len().saturating_sub(*position);
                (remaining, Some(remaining))
            }
            Source::Stream(_) => (0, None),
        }
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Chunks { chunks, position } => f
                .debug_struct("Content")
                .field("chunks", &chunks.len())
                .field("position", position)
                .finish(),
            Source::Stream(_) => f
                .debug_struct("Content")
                .field("stream", &"single-pass")
                .finish(),
        }
    }
}
