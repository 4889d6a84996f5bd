use thiserror::Error;

pub type Result<T> = std::result::Result<T, Web3FileError>;

#[derive(Error, Debug)]
pub enum Web3FileError {
    /// Errors raised by a payload stream are carried through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Path error: {0}")]
    Path(String),
    #[error("Parsing error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for Web3FileError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}
