//! Privacy levels selectable per send.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::NostrkitError;

/// Which envelope protects a message on its way to each recipient.
///
/// `"standard"` parses to [`PrivacyLevel::Encrypted`]: both labels have
/// always produced the same pairwise ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrivacyLevel {
    /// Seal + gift wrap under an ephemeral identity.
    #[default]
    #[serde(rename = "giftwrapped")]
    GiftWrapped,
    /// Pairwise ciphertext in a direct-message event.
    #[serde(rename = "encrypted", alias = "standard")]
    Encrypted,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GiftWrapped => "giftwrapped",
            Self::Encrypted => "encrypted",
        }
    }

    /// Parse a level label, rejecting anything unknown.
    pub fn parse(label: &str) -> Result<Self, NostrkitError> {
        match label {
            "giftwrapped" => Ok(Self::GiftWrapped),
            "encrypted" | "standard" => Ok(Self::Encrypted),
            other => Err(NostrkitError::UnknownPrivacyLevel(other.to_string())),
        }
    }
}

impl FromStr for PrivacyLevel {
    type Err = NostrkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PrivacyLevel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
