//! Results of send and verify

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::RiskFlags;

/// Result of an admitted send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    /// Canonical E.164 phone
    pub phone: String,
    pub record_id: Uuid,
    /// Client session id, or the record id when none was supplied
    pub session_id: String,
    pub risk_score: u8,
    pub risk_flags: RiskFlags,
    pub require_captcha: bool,
    pub expires_at: DateTime<Utc>,
    /// Provider message id when the gateway accepted the message
    pub message_id: Option<String>,
    /// False when a gateway failure was tolerated
    pub sms_delivered: bool,
    /// Rate limiting could not be enforced for this request
    pub rate_limit_degraded: bool,
}

/// Result of a successful verify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub phone: String,
    pub verified_at: DateTime<Utc>,
    /// Flags raised during this verify, consistency mismatches included
    pub risk_flags: RiskFlags,
    /// Successful verifications of this phone, this one included
    pub verification_count: Option<i64>,
}
