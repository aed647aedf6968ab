//! Reply language preference

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language the assistant should answer in
///
/// Deserializes from any spelling `FromStr` accepts, serializes to the
/// display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum LanguagePreference {
    #[default]
    English,
    Hindi,
    /// Mix English and Hindi as the user does
    Both,
}

impl LanguagePreference {
    /// Human-readable name, embedded verbatim in the system instruction
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Both => "Both",
        }
    }
}

impl std::fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LanguagePreference {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "hindi" | "hi" => Ok(Self::Hindi),
            "both" | "en-hi" | "hinglish" => Ok(Self::Both),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown language preference: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for LanguagePreference {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
