//! Timestamp semantics selectable for a sampling window

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which timestamp of an entry the timestamp source should return
///
/// The serialized names match the historical configuration values. Any
/// value other than `"date"` selects [`TimeField::ObservedAt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum TimeField {
    /// The publication date declared by the source itself
    #[serde(rename = "date")]
    DeclaredAt,

    /// When the poller first saw the entry
    #[default]
    #[serde(rename = "lastSeen")]
    ObservedAt,
}

impl TimeField {
    /// The other semantic, used as a fallback when this one carries no signal
    pub fn alternate(self) -> Self {
        match self {
            TimeField::DeclaredAt => TimeField::ObservedAt,
            TimeField::ObservedAt => TimeField::DeclaredAt,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeField::DeclaredAt => "date",
            TimeField::ObservedAt => "lastSeen",
        }
    }
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeField {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "date" | "declared" | "declaredAt" => TimeField::DeclaredAt,
            _ => TimeField::ObservedAt,
        })
    }
}

impl From<String> for TimeField {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(field) => field,
            Err(never) => match never {},
        }
    }
}
