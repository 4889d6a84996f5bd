use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque content identifier attached to a file by the caller.
///
/// The value is kept exactly as given. It is never parsed, validated or
/// recomputed from the payload, so a `ContentId` says nothing about whether
/// it actually matches the bytes it travels with.
#[derive(
    Eq, Ord, PartialEq, PartialOrd, Hash, Clone, Debug, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
