//! Verification record entity: one pending OTP per phone number.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::RequestContext;
use super::risk::RiskFlags;

/// Maximum number of failed verification attempts before a record locks
pub const MAX_ATTEMPTS: i32 = 5;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default expiration time for verification codes (5 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

/// Lifecycle state of a record, evaluated lazily against the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Verified,
    Expired,
    Locked,
}

/// An issued one-time passcode and the context it was issued under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: Uuid,

    /// Canonical E.164 phone number
    pub phone: String,

    /// The 6-digit code
    pub code: String,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Failed verification attempts so far
    pub attempts: i32,

    pub verified: bool,

    pub verified_at: Option<DateTime<Utc>>,

    pub request_ip: Option<String>,

    pub fingerprint_hash: Option<String>,

    pub session_id: Option<String>,

    /// Composite risk score at send time (0-100)
    pub risk_score: u8,

    pub risk_flags: RiskFlags,

    pub required_captcha: bool,
}

impl VerificationRecord {
    /// Creates a fresh pending record
    ///
    /// # Arguments
    ///
    /// * `phone` - Canonical E.164 phone number
    /// * `code` - The generated code
    /// * `ttl` - Validity window from now
    pub fn new(phone: impl Into<String>, code: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone: phone.into(),
            code: code.into(),
            created_at: now,
            expires_at: now + ttl,
            attempts: 0,
            verified: false,
            verified_at: None,
            request_ip: None,
            fingerprint_hash: None,
            session_id: None,
            risk_score: 0,
            risk_flags: RiskFlags::new(),
            required_captcha: false,
        }
    }

    /// Capture the sender's IP, fingerprint and session
    pub fn with_context(mut self, context: &RequestContext) -> Self {
        self.request_ip = context.ip.clone();
        self.fingerprint_hash = context.fingerprint_hash.clone();
        self.session_id = context.session_id.clone();
        self
    }

    /// Capture the policy verdict the record was issued under
    pub fn with_risk(mut self, risk_score: u8, risk_flags: RiskFlags, required_captcha: bool) -> Self {
        self.risk_score = risk_score;
        self.risk_flags = risk_flags;
        self.required_captcha = required_captcha;
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_locked(&self, max_attempts: i32) -> bool {
        self.attempts >= max_attempts
    }

    pub fn remaining_attempts(&self, max_attempts: i32) -> i32 {
        (max_attempts - self.attempts).max(0)
    }

    /// State at `now`; expiry wins over lockout
    pub fn status_at(&self, now: DateTime<Utc>, max_attempts: i32) -> RecordStatus {
        if self.verified {
            RecordStatus::Verified
        } else if self.is_expired_at(now) {
            RecordStatus::Expired
        } else if self.is_locked(max_attempts) {
            RecordStatus::Locked
        } else {
            RecordStatus::Pending
        }
    }
}
