//! Audit entry entity recording every send and verify attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use pv_shared::phone::mask_phone_number;

use super::context::RequestContext;
use super::risk::RiskFlags;

/// Which operation produced the entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttemptType {
    Send,
    Verify,
}

impl AttemptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Verify => "verify",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "send" => Some(Self::Send),
            "verify" => Some(Self::Verify),
            _ => None,
        }
    }
}

/// Precise internal outcome of an attempt
///
/// Public responses collapse several of these into one generic message;
/// the audit trail keeps them apart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    /// Code dispatched nowhere but accepted outside production
    SmsFailureTolerated,
    ValidationError,
    Cooldown,
    NotFound,
    Expired,
    Locked,
    InvalidCode,
    RateLimited,
    CaptchaRequired,
    InfrastructureError,
}

impl AuditStatus {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::SmsFailureTolerated => "SMS_FAILURE_TOLERATED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::Cooldown => "COOLDOWN",
            Self::NotFound => "NOT_FOUND",
            Self::Expired => "EXPIRED",
            Self::Locked => "LOCKED",
            Self::InvalidCode => "INVALID_CODE",
            Self::RateLimited => "RATE_LIMITED",
            Self::CaptchaRequired => "CAPTCHA_REQUIRED",
            Self::InfrastructureError => "INFRASTRUCTURE_ERROR",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(Self::Success),
            "SMS_FAILURE_TOLERATED" => Some(Self::SmsFailureTolerated),
            "VALIDATION_ERROR" => Some(Self::ValidationError),
            "COOLDOWN" => Some(Self::Cooldown),
            "NOT_FOUND" => Some(Self::NotFound),
            "EXPIRED" => Some(Self::Expired),
            "LOCKED" => Some(Self::Locked),
            "INVALID_CODE" => Some(Self::InvalidCode),
            "RATE_LIMITED" => Some(Self::RateLimited),
            "CAPTCHA_REQUIRED" => Some(Self::CaptchaRequired),
            "INFRASTRUCTURE_ERROR" => Some(Self::InfrastructureError),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::SmsFailureTolerated)
    }
}

/// Append-only record of one send or verify attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: Uuid,

    pub attempt_type: AttemptType,

    pub status: AuditStatus,

    /// Masked phone number (e.g. "+81****5678")
    pub phone_masked: Option<String>,

    /// SHA-256 of the canonical phone number for correlation
    pub phone_hash: Option<String>,

    pub ip_address: Option<String>,

    pub fingerprint_hash: Option<String>,

    pub session_id: Option<String>,

    pub user_agent: Option<String>,

    pub risk_score: u8,

    pub risk_flags: RiskFlags,

    /// Internal error description, never shown to clients
    pub detail: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(attempt_type: AttemptType, status: AuditStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt_type,
            status,
            phone_masked: None,
            phone_hash: None,
            ip_address: None,
            fingerprint_hash: None,
            session_id: None,
            user_agent: None,
            risk_score: 0,
            risk_flags: RiskFlags::new(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    /// Store the phone masked and hashed, never in clear text
    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone_masked = Some(mask_phone_number(phone));
        self.phone_hash = Some(hash_phone(phone));
        self
    }

    pub fn with_context(mut self, context: &RequestContext) -> Self {
        self.ip_address = context.ip.clone();
        self.fingerprint_hash = context.fingerprint_hash.clone();
        self.session_id = context.session_id.clone();
        self.user_agent = context.user_agent.clone();
        self
    }

    pub fn with_risk(mut self, risk_score: u8, risk_flags: RiskFlags) -> Self {
        self.risk_score = risk_score;
        self.risk_flags = risk_flags;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Hex-encoded SHA-256 of a phone number
pub fn hash_phone(phone: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(phone.as_bytes());
    hex::encode(hasher.finalize())
}
