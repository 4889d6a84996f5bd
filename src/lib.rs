//! # web3file
//!
//! A file-like value pairing a name and a bit of metadata with a lazily
//! consumed byte payload, so that code producing or consuming files on a
//! content-addressed network can hand them around without settling on an
//! in-memory representation first.
//!
//! The payload of a [`Web3File`] can be read three ways: as a stream of
//! chunks ([`Web3File::content`], or by polling the file itself), as one
//! [`Blob`] ([`Web3File::blob`]) and as text ([`Web3File::text`]).
//!
//! ```rust,no_run
//! # async fn example() -> web3file::Result<()> {
//! use web3file::{FileOptions, Web3File};
//!
//! let file = Web3File::from_text(
//!     "file.txt",
//!     "web3file",
//!     FileOptions::default().with_path("/dir/file.txt"),
//! );
//! assert_eq!(file.name(), "file.txt");
//! assert_eq!(file.text().await?, "web3file");
//! # Ok(())
//! # }
//! ```

mod blob;
mod content;
mod errors;
mod file;
mod id;
mod options;
mod platform;

pub use blob::{Blob, BLOB_STREAM_CHUNK};
pub use content::{reader_stream, ByteStream, Content, READ_BUFFER_CAPACITY};
pub use errors::{Result, Web3FileError};
pub use file::Web3File;
pub use id::ContentId;
pub use options::{now_millis, FileMeta, FileOptions};
pub use platform::{File, FileLike, LocalFile};
