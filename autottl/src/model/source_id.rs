//! Source identity type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a monitored feed/source
///
/// Opaque to the estimator; collaborators decide its format. Leading and
/// trailing whitespace is trimmed so ids read from fixtures or CLI args
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        SourceId::new(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        SourceId::new(s)
    }
}

impl From<u64> for SourceId {
    fn from(n: u64) -> Self {
        SourceId(n.to_string())
    }
}
