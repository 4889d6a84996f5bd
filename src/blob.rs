use bytes::{Bytes, BytesMut};
use futures::stream;

use crate::content::ByteStream;

/// Largest chunk handed out by [`Blob::stream`].
pub const BLOB_STREAM_CHUNK: usize = 64 * 1024;

/// Immutable in-memory byte buffer.
///
/// Cloning is cheap, the underlying buffer is reference counted.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob {
    data: Bytes,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Concatenates `parts` in order. A single part is taken over without
    /// copying.
    pub fn from_parts<I, B>(parts: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let mut parts: Vec<Bytes> = parts.into_iter().map(Into::into).collect();
        let data = match parts.len() {
            0 => Bytes::new(),
            1 => parts.remove(0),
            _ => {
                let total = parts.iter().map(Bytes::len).sum();
                let mut buffer = BytesMut::with_capacity(total);
                for part in &parts {
                    buffer.extend_from_slice(part);
                }
                buffer.freeze()
            }
        };
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Same as [`Blob::bytes`], named after the web API.
    pub fn array_buffer(&self) -> Bytes {
        self.bytes()
    }

    /// Decodes as UTF-8, replacing invalid sequences with U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Opens a new single-pass stream over the blob's bytes.
    ///
    /// Every call starts from the beginning. Chunks are zero-copy slices of
    /// at most [`BLOB_STREAM_CHUNK`] bytes.
    pub fn stream(&self) -> ByteStream {
        let data = self.data.clone();
        let chunks = (0..data.len())
            .step_by(BLOB_STREAM_CHUNK)
            .map(move |start| {
                let end = (start + BLOB_STREAM_CHUNK).min(data.len());
                Ok(data.slice(start..end))
            });
        Box::pin(stream::iter(chunks))
    }
}

impl From<Bytes> for Blob {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob").field("len", &self.len()).finish()
    }
}
