use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{Stream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use crate::blob::Blob;
use crate::content::{reader_stream, ByteStream, Content};
use crate::id::ContentId;
use crate::options::{now_millis, FileMeta, FileOptions};
use crate::platform::FileLike;
use crate::Result;

/// A named, lazily consumed byte payload with optional metadata.
///
/// Every constructor takes the name first and the payload second.
///
/// Whether the payload can be read more than once depends on how the file
/// was built:
///
/// | factory | payload |
/// |---|---|
/// | [`from_bytes`], [`from_text`], [`from_chunks`] | repeatable |
/// | [`from_stream`], [`from_receiver`], [`from_reader`], [`from_blob`], [`from_file`] | single-pass |
///
/// On a single-pass payload, [`blob`] and [`text`] exhaust the source and a
/// second call returns an empty result.
///
/// [`from_bytes`]: Web3File::from_bytes
/// [`from_text`]: Web3File::from_text
/// [`from_chunks`]: Web3File::from_chunks
/// [`from_stream`]: Web3File::from_stream
/// [`from_receiver`]: Web3File::from_receiver
/// [`from_reader`]: Web3File::from_reader
/// [`from_blob`]: Web3File::from_blob
/// [`from_file`]: Web3File::from_file
/// [`blob`]: Web3File::blob
/// [`text`]: Web3File::text
#[derive(Clone)]
pub struct Web3File {
    name: String,
    path: String,
    last_modified: u64,
    cid: Option<ContentId>,
    content: Content,
    cursor: Content,
}

impl Web3File {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<Content>,
        options: FileOptions,
    ) -> Self {
        let content = content.into();
        let FileOptions {
            path,
            last_modified,
            cid,
        } = options;

        Self {
            name: name.into(),
            path: path.unwrap_or_default(),
            last_modified: last_modified.unwrap_or_else(now_millis),
            cid,
            cursor: content.restart(),
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    pub fn cid(&self) -> Option<&ContentId> {
        self.cid.as_ref()
    }

    /// The payload source. For single-pass payloads every returned value
    /// reads from the same underlying stream.
    pub fn content(&self) -> Content {
        self.content.restart()
    }

    /// Alias of [`Web3File::content`].
    pub fn iterator(&self) -> Content {
        self.content()
    }

    pub fn is_repeatable(&self) -> bool {
        self.content.is_repeatable()
    }

    pub fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            path: self.path.clone(),
            last_modified: self.last_modified,
            cid: self.cid.clone(),
        }
    }

    /// Drains the payload in order into a single [`Blob`].
    ///
    /// The first error raised by the payload is returned as is.
    pub async fn blob(&self) -> Result<Blob> {
        let parts: Vec<Bytes> = self.content().try_collect().await?;
        let blob = Blob::from_parts(parts);
        log::trace!("{}: collected {} bytes", self.name, blob.len());
        Ok(blob)
    }

    /// Drains the payload and decodes it as UTF-8, replacing invalid
    /// sequences with U+FFFD.
    pub async fn text(&self) -> Result<String> {
        Ok(self.blob().await?.text())
    }

    pub fn from_bytes(
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
        options: FileOptions,
    ) -> Self {
        let bytes: Bytes = bytes.into();
        Self::new(name, Content::chunks([bytes]), options)
    }

    pub fn from_text(
        name: impl Into<String>,
        text: impl Into<String>,
        options: FileOptions,
    ) -> Self {
        Self::from_bytes(name, Bytes::from(text.into()), options)
    }

    pub fn from_chunks<I, B>(
        name: impl Into<String>,
        chunks: I,
        options: FileOptions,
    ) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self::new(name, Content::chunks(chunks), options)
    }

    /// Wraps a pull-based chunk stream.
    pub fn from_stream<S>(
        name: impl Into<String>,
        stream: S,
        options: FileOptions,
    ) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        let name = name.into();
        log::debug!("{}: adapting chunk stream", name);
        Self::new(name, Content::stream(stream), options)
    }

    /// Wraps a push-based source: chunks arrive as the sender pushes them
    /// and the payload ends when every sender is dropped.
    pub fn from_receiver(
        name: impl Into<String>,
        mut receiver: mpsc::Receiver<io::Result<Bytes>>,
        options: FileOptions,
    ) -> Self {
        let stream = futures::stream::poll_fn(move |cx| receiver.poll_recv(cx));
        Self::from_stream(name, stream, options)
    }

    pub fn from_reader<R>(
        name: impl Into<String>,
        reader: R,
        options: FileOptions,
    ) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_stream(name, reader_stream(reader), options)
    }

    pub fn from_blob(
        name: impl Into<String>,
        blob: &Blob,
        options: FileOptions,
    ) -> Self {
        Self::from_stream(name, blob.stream(), options)
    }

    /// Takes name and modification time from `file`. An explicit
    /// `options.last_modified` wins over the file's own.
    pub fn from_file<F>(file: &F, options: FileOptions) -> Self
    where
        F: FileLike + ?Sized,
    {
        let options = FileOptions {
            last_modified: options
                .last_modified
                .or(Some(file.last_modified())),
            ..options
        };
        Self::from_stream(file.name(), file.open_stream(), options)
    }
}

impl FileLike for Web3File {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> u64 {
        self.last_modified
    }

    /// Repeatable payloads start over. A single-pass payload is shared, so
    /// a file built from this stream drains `self` as it is read.
    fn open_stream(&self) -> ByteStream {
        self.content().boxed()
    }
}

/// Iterating the file itself reads its payload through a cursor of its
/// own, sharing the source with [`Web3File::content`].
impl Stream for Web3File {
    type Item = io::Result<Bytes>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.cursor.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl std::fmt::Debug for Web3File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3File")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("last_modified", &self.last_modified)
            .field("cid", &self.cid)
            .field("content", &self.content)
            .finish()
    }
}
