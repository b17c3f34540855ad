//! Sliding-window counter rows for the multi-dimensional rate limiter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dimension a counter row is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Phone,
    Ip,
    Fingerprint,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Ip => "ip",
            Self::Fingerprint => "fingerprint",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "phone" => Some(Self::Phone),
            "ip" => Some(Self::Ip),
            "fingerprint" => Some(Self::Fingerprint),
            _ => None,
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One admitted send, counted against one identifier
///
/// `phone` and `ip` record the request that produced the row so the
/// limiter can count distinct phones per IP and distinct IPs per phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    pub id: Uuid,
    pub kind: IdentifierKind,
    pub value: String,
    pub phone: String,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RateLimitCounter {
    pub fn new(
        kind: IdentifierKind,
        value: impl Into<String>,
        phone: impl Into<String>,
        ip: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            value: value.into(),
            phone: phone.into(),
            ip,
            created_at,
        }
    }
}
