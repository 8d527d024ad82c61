//! Checkout status of an owned book.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a book in the collection is on the shelf or lent out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    #[default]
    Available,
    CheckedOut,
}

impl BookStatus {
    /// The other status.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Available => Self::CheckedOut,
            Self::CheckedOut => Self::Available,
        }
    }

    /// Display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::CheckedOut => "Checked Out",
        }
    }

    /// Stable tag used in persisted data and CSV export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::CheckedOut => "checked_out",
        }
    }

    /// Label of the action that moves a book out of this status.
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Available => "Check Out",
            Self::CheckedOut => "Return",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown book status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for BookStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "checked_out" | "checked-out" | "checkedout" => Ok(Self::CheckedOut),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
