//! Cached carrier intelligence for a phone number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Line type reported by the lookup provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Mobile,
    Landline,
    Voip,
    Unknown,
}

impl LineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Landline => "landline",
            Self::Voip => "voip",
            Self::Unknown => "unknown",
        }
    }

    /// Map provider vocabularies onto the four line types
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "mobile" | "cellular" | "wireless" => Self::Mobile,
            "landline" | "fixed" => Self::Landline,
            "voip" | "fixedvoip" | "nonfixedvoip" => Self::Voip,
            _ => Self::Unknown,
        }
    }
}

/// Persisted outcome of a phone intelligence lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneIntelligenceRecord {
    /// Canonical E.164 phone number
    pub phone: String,

    pub is_valid: bool,

    pub carrier: Option<String>,

    pub line_type: LineType,

    /// Calling code without `+`, e.g. "81"
    pub country_code: Option<String>,

    /// Composite risk score (0-100), lowered after successful verifications
    pub risk_score: u8,

    /// Last successful verification of this phone
    pub last_verification: Option<DateTime<Utc>>,

    /// When the lookup data was fetched
    pub updated_at: DateTime<Utc>,
}

impl PhoneIntelligenceRecord {
    /// Whether the lookup data is younger than `ttl` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.updated_at < ttl
    }
}
