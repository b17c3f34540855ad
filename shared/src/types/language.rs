//! Language negotiation for user-facing messages

use serde::{Deserialize, Serialize};

/// Language of user-facing error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ja")]
    Japanese,
}

impl Language {
    /// Pick the first supported language from an `Accept-Language` header
    ///
    /// Quality values are ignored; the first listed supported tag wins.
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_lowercase())
            .find_map(|tag| {
                let primary = tag.split('-').next().unwrap_or_default().to_string();
                primary.parse().ok()
            })
            .unwrap_or_default()
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Japanese => "ja",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Language::English),
            "ja" | "jp" | "jpn" | "japanese" | "日本語" => Ok(Language::Japanese),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}
