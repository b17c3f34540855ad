//! Risk flags raised by the rate limiter, intelligence lookup and consistency checks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Abuse signal attached to a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    PhoneRateLimit,
    IpRateLimit,
    FingerprintRateLimit,
    PhoneEnumeration,
    SuspiciousIp,
    SuspiciousPhone,
    DeviceMismatch,
    SessionMismatch,
    VoipNumber,
    HighRiskPhone,
}

/// Ordered set of flags; ordering keeps persisted and logged output stable
pub type RiskFlags = BTreeSet<RiskFlag>;

impl RiskFlag {
    pub const ALL: [RiskFlag; 10] = [
        RiskFlag::PhoneRateLimit,
        RiskFlag::IpRateLimit,
        RiskFlag::FingerprintRateLimit,
        RiskFlag::PhoneEnumeration,
        RiskFlag::SuspiciousIp,
        RiskFlag::SuspiciousPhone,
        RiskFlag::DeviceMismatch,
        RiskFlag::SessionMismatch,
        RiskFlag::VoipNumber,
        RiskFlag::HighRiskPhone,
    ];

    /// Tag used in storage, logs and API bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhoneRateLimit => "PHONE_RATE_LIMIT",
            Self::IpRateLimit => "IP_RATE_LIMIT",
            Self::FingerprintRateLimit => "FINGERPRINT_RATE_LIMIT",
            Self::PhoneEnumeration => "PHONE_ENUMERATION",
            Self::SuspiciousIp => "SUSPICIOUS_IP",
            Self::SuspiciousPhone => "SUSPICIOUS_PHONE",
            Self::DeviceMismatch => "DEVICE_MISMATCH",
            Self::SessionMismatch => "SESSION_MISMATCH",
            Self::VoipNumber => "VOIP_NUMBER",
            Self::HighRiskPhone => "HIGH_RISK_PHONE",
        }
    }

    /// Parse from the storage tag
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|flag| flag.as_str() == tag)
    }

    /// Hard flags force a captcha regardless of the numeric score
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            Self::PhoneEnumeration | Self::SuspiciousIp | Self::SuspiciousPhone
        )
    }

    /// Raised when a per-identifier sliding window is exhausted
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            Self::PhoneRateLimit | Self::IpRateLimit | Self::FingerprintRateLimit
        )
    }
}

impl std::fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated storage form
pub fn join_flags(flags: &RiskFlags) -> String {
    flags
        .iter()
        .map(RiskFlag::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of [`join_flags`]; unknown tags are skipped
pub fn split_flags(raw: &str) -> RiskFlags {
    raw.split(',')
        .filter_map(|tag| RiskFlag::parse(tag.trim()))
        .collect()
}
