//! Types produced by the rate limiter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{IdentifierKind, RiskFlag, RiskFlags};

/// Identifiers of one send request
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRequest<'a> {
    /// Normalized E.164 phone
    pub phone: &'a str,
    pub ip: Option<&'a str>,
    pub fingerprint: Option<&'a str>,
}

impl<'a> RateLimitRequest<'a> {
    pub fn new(phone: &'a str, ip: Option<&'a str>, fingerprint: Option<&'a str>) -> Self {
        Self {
            phone,
            ip: ip.filter(|v| !v.trim().is_empty()),
            fingerprint: fingerprint.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Supplied identifiers, phone first
    pub fn identifiers(&self) -> Vec<(IdentifierKind, &'a str)> {
        let mut identifiers = vec![(IdentifierKind::Phone, self.phone)];
        if let Some(ip) = self.ip {
            identifiers.push((IdentifierKind::Ip, ip));
        }
        if let Some(fingerprint) = self.fingerprint {
            identifiers.push((IdentifierKind::Fingerprint, fingerprint));
        }
        identifiers
    }
}

/// Window state of one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierStatus {
    pub kind: IdentifierKind,
    pub allowed: bool,
    /// Rows counted inside the window before this request
    pub count: u64,
    pub limit: u32,
    /// Sends left in the window if this request is admitted
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl IdentifierStatus {
    /// Flag raised when this identifier is over its limit
    pub fn exceeded_flag(&self) -> Option<RiskFlag> {
        if self.allowed {
            return None;
        }
        Some(match self.kind {
            IdentifierKind::Phone => RiskFlag::PhoneRateLimit,
            IdentifierKind::Ip => RiskFlag::IpRateLimit,
            IdentifierKind::Fingerprint => RiskFlag::FingerprintRateLimit,
        })
    }
}

/// Combined answer of the limiter for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitReport {
    pub statuses: Vec<IdentifierStatus>,
    /// Enumeration flags from the cross-identifier counts
    pub enumeration_flags: RiskFlags,
    pub distinct_phones_for_ip: Option<u64>,
    pub distinct_ips_for_phone: u64,
    /// The counter store could not be read; the request was let through
    pub degraded: bool,
    /// Counter rows appended for this request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved: Vec<Uuid>,
}

impl RateLimitReport {
    /// Report for a request that was not checked
    pub fn fail_open() -> Self {
        Self {
            degraded: true,
            ..Default::default()
        }
    }

    /// Every supplied identifier is within its limit
    pub fn allowed(&self) -> bool {
        self.statuses.iter().all(|s| s.allowed)
    }

    pub fn status(&self, kind: IdentifierKind) -> Option<&IdentifierStatus> {
        self.statuses.iter().find(|s| s.kind == kind)
    }

    /// Per-identifier limit flags
    pub fn limit_flags(&self) -> RiskFlags {
        self.statuses.iter().filter_map(|s| s.exceeded_flag()).collect()
    }

    /// Limit and enumeration flags together
    pub fn flags(&self) -> RiskFlags {
        let mut flags = self.limit_flags();
        flags.extend(self.enumeration_flags.iter().copied());
        flags
    }
}
