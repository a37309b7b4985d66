use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shopping platform a price quote originates from.
///
/// Adding a platform means adding a variant here plus its display name in
/// [`Platform::display_name`]; exhaustive matches keep the rest of the
/// codebase honest at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    Flipkart,
    Tira,
    Myntra,
}

impl Platform {
    /// Every known platform, in presentation order.
    pub const ALL: [Platform; 4] = [
        Platform::Amazon,
        Platform::Flipkart,
        Platform::Tira,
        Platform::Myntra,
    ];

    /// Lowercase identifier used in config files, query params, and the DB.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Flipkart => "flipkart",
            Platform::Tira => "tira",
            Platform::Myntra => "myntra",
        }
    }

    /// Human-facing name for listings and CLI output.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Amazon => "Amazon",
            Platform::Flipkart => "Flipkart",
            Platform::Tira => "Tira",
            Platform::Myntra => "Myntra",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct ParsePlatformError(pub String);

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "amazon" => Ok(Platform::Amazon),
            "flipkart" => Ok(Platform::Flipkart),
            "tira" => Ok(Platform::Tira),
            "myntra" => Ok(Platform::Myntra),
            other => Err(ParsePlatformError(other.to_string())),
        }
    }
}
