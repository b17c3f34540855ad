//! Verification error taxonomy
//!
//! Display strings are internal and end up in logs and audit rows.
//! Public, localized wording is chosen by the presentation layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::entities::{AuditStatus, RiskFlags};

/// Outcomes of send and verify that are not infrastructure failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid phone format: {phone}")]
    InvalidPhoneFormat { phone: String },

    #[error("Invalid verification code format")]
    InvalidCodeFormat,

    #[error("Phone verified recently, next eligible at {next_eligible_at}")]
    Cooldown { next_eligible_at: DateTime<Utc> },

    #[error("No pending verification for phone")]
    NotFound,

    #[error("Verification code expired")]
    Expired,

    #[error("Maximum attempts exceeded")]
    Locked,

    #[error("Invalid verification code, {remaining_attempts} attempts remaining")]
    InvalidCode { remaining_attempts: i32 },

    #[error("Rate limit exceeded (risk score {risk_score})")]
    RateLimited {
        risk_score: u8,
        risk_flags: RiskFlags,
        require_captcha: bool,
    },

    #[error("Captcha required (risk score {risk_score})")]
    CaptchaRequired { risk_score: u8, risk_flags: RiskFlags },

    #[error("SMS service failure")]
    SmsServiceFailure,
}

impl VerificationError {
    /// Audit status recording this precise outcome
    pub fn audit_status(&self) -> AuditStatus {
        match self {
            Self::InvalidPhoneFormat { .. } | Self::InvalidCodeFormat => AuditStatus::ValidationError,
            Self::Cooldown { .. } => AuditStatus::Cooldown,
            Self::NotFound => AuditStatus::NotFound,
            Self::Expired => AuditStatus::Expired,
            Self::Locked => AuditStatus::Locked,
            Self::InvalidCode { .. } => AuditStatus::InvalidCode,
            Self::RateLimited { .. } => AuditStatus::RateLimited,
            Self::CaptchaRequired { .. } => AuditStatus::CaptchaRequired,
            Self::SmsServiceFailure => AuditStatus::InfrastructureError,
        }
    }
}
