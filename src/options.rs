use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::id::ContentId;
use crate::Result;

/// Optional metadata accepted by [`Web3File`](crate::Web3File) and all of
/// its factories.
#[derive(Default, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOptions {
    /// Logical path hint. Read back as `""` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Milliseconds since the Unix epoch. Defaults to the time the file
    /// handle is constructed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
    /// Caller-supplied content identifier. Defaults to none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<ContentId>,
}

impl FileOptions {
    /// Parses options from JSON, e.g.
    /// `{"path": "/dir/file.txt", "lastModified": 1700000000000}`.
    /// Missing fields stay unset.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_last_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn with_cid(mut self, cid: impl Into<ContentId>) -> Self {
        self.cid = Some(cid.into());
        self
    }
}

/// Serializable snapshot of a file handle's metadata. Payload is not
/// included.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub path: String,
    pub last_modified: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<ContentId>,
}

/// Current wall clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    to_millis(SystemTime::now())
}

pub(crate) fn to_millis(time: SystemTime) -> u64 {
    // clocks set before 1970 collapse to zero
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_json() {
        let json = r#"{"path":"/dir/file.txt","lastModified":1700000000000}"#;
        let options = FileOptions::from_json(json).unwrap();
        assert_eq!(
            options,
            FileOptions::default()
                .with_path("/dir/file.txt")
                .with_last_modified(1_700_000_000_000)
        );
        assert!(options.cid.is_none());

        let empty = FileOptions::from_json("{}").unwrap();
        assert_eq!(empty, FileOptions::default());
    }

    #[test]
    fn malformed_options() {
        let err = FileOptions::from_json(r#"{"lastModified":"yesterday"}"#)
            .unwrap_err();
        assert!(matches!(err, crate::Web3FileError::Parse(_)));
    }

    #[test]
    fn unset_options_are_not_serialized() {
        let json = serde_json::to_string(&FileOptions::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn millis_before_epoch() {
        let before = UNIX_EPOCH - std::time::Duration::from_secs(10);
        assert_eq!(to_millis(before), 0);
        assert!(now_millis() > 0);
    }
}
