//! Platform file types accepted by [`Web3File::from_file`].
//!
//! [`Web3File::from_file`]: crate::Web3File::from_file

use std::fs;
use std::path::{Path, PathBuf};

use async_stream::stream;
use bytes::Bytes;

use crate::blob::Blob;
use crate::content::{reader_stream, ByteStream};
use crate::options::{now_millis, to_millis};
use crate::{Result, Web3FileError};

/// Anything that looks like a file: a name, a modification time and a way
/// to read its bytes.
pub trait FileLike {
    fn name(&self) -> &str;

    /// Milliseconds since the Unix epoch.
    fn last_modified(&self) -> u64;

    /// Opens a stream over the file's bytes.
    ///
    /// Whether the stream starts from the first byte is up to the
    /// implementor. [`File`] and [`LocalFile`] always start over, while a
    /// stream-backed [`Web3File`](crate::Web3File) hands out its shared,
    /// single-pass source.
    fn open_stream(&self) -> ByteStream;
}

/// Named in-memory blob, the counterpart of the web `File`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct File {
    blob: Blob,
    name: String,
    last_modified: u64,
}

impl File {
    /// Builds a file from `parts`, stamped with the current time.
    pub fn new<I, B>(parts: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            blob: Blob::from_parts(parts),
            name: name.into(),
            last_modified: now_millis(),
        }
    }

    pub fn with_last_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }
}

impl FileLike for File {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> u64 {
        self.last_modified
    }

    fn open_stream(&self) -> ByteStream {
        self.blob.stream()
    }
}

/// File on the local filesystem.
///
/// Metadata is read once by [`LocalFile::open`]. The file itself is only
/// opened when a stream returned by [`FileLike::open_stream`] is first
/// polled, and every stream opens it anew.
#[derive(Clone, Debug)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    last_modified: u64,
    size: u64,
}

impl LocalFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path)?;
        if metadata.is_dir() {
            return Err(Web3FileError::Path(format!(
                "{} is a directory",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Web3FileError::Path(format!(
                    "{} has no file name",
                    path.display()
                ))
            })?;
        let last_modified = to_millis(metadata.modified()?);

        log::debug!(
            "Opened local file {} ({} bytes, modified at {})",
            path.display(),
            metadata.len(),
            last_modified
        );

        Ok(Self {
            path,
            name,
            last_modified,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes as of [`LocalFile::open`].
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl FileLike for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> u64 {
        self.last_modified
    }

    fn open_stream(&self) -> ByteStream {
        let path = self.path.clone();
        Box::pin(stream! {
            log::trace!("Reading {}", path.display());
            match tokio::fs::File::open(&path).await {
                Ok(file) => {
                    for await chunk in reader_stream(file) {
                        yield chunk;
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Write;
    use tempdir::TempDir;

    #[tokio::test]
    async fn in_memory_file() {
        let file = File::new(vec![&b"web3"[..], b"file"], "file.txt")
            .with_last_modified(42);
        assert_eq!(file.name(), "file.txt");
        assert_eq!(file.last_modified(), 42);

        let chunks: Vec<Bytes> = file.open_stream().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"web3file");
        assert_eq!(file.blob().text(), "web3file");
    }

    #[tokio::test]
    async fn local_file_is_read_lazily() {
        let dir = TempDir::new("web3file_test").unwrap();
        let path = dir.path().join("file.txt");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"web3file")
            .unwrap();

        let file = LocalFile::open(&path).unwrap();
        assert_eq!(file.name(), "file.txt");
        assert_eq!(file.size(), 8);
        assert!(file.last_modified() > 0);

        let stream = file.open_stream();
        // rewritten before the first poll, so the new bytes are seen
        fs::write(&path, b"rewritten").unwrap();
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"rewritten");
    }

    #[tokio::test]
    async fn missing_local_file() {
        let dir = TempDir::new("web3file_test").unwrap();
        let path = dir.path().join("missing.txt");
        assert!(matches!(LocalFile::open(&path), Err(Web3FileError::Io(_))));

        assert!(matches!(
            LocalFile::open(dir.path()),
            Err(Web3FileError::Path(_))
        ));
    }

    #[tokio::test]
    async fn removed_local_file_fails_on_read() {
        let dir = TempDir::new("web3file_test").unwrap();
        let path = dir.path().join("gone.txt");
        fs::write(&path, b"soon gone").unwrap();

        let file = LocalFile::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let err = file
            .open_stream()
            .try_collect::<Vec<Bytes>>()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
