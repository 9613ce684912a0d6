use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// UI and letter language. Sent to the relay by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }

    /// Picks the English or Hindi variant of a UI string.
    pub fn pick<'a>(&self, english: &'a str, hindi: &'a str) -> &'a str {
        match self {
            Language::English => english,
            Language::Hindi => hindi,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" | "हिन्दी" | "हिंदी" => Ok(Language::Hindi),
            other => Err(format!("unsupported language '{other}' (expected English or Hindi)")),
        }
    }
}
