//! Verified phone identity used for the re-verification cooldown.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Canonical E.164 phone number
    pub phone: String,

    pub last_verified_at: DateTime<Utc>,

    pub verification_count: i64,
}

impl UserIdentity {
    /// Identity created by a first successful verification
    pub fn first_verification(phone: impl Into<String>, verified_at: DateTime<Utc>) -> Self {
        Self {
            phone: phone.into(),
            last_verified_at: verified_at,
            verification_count: 1,
        }
    }

    /// Earliest moment the phone may verify again
    pub fn next_eligible_at(&self, cooldown: Duration) -> DateTime<Utc> {
        self.last_verified_at + cooldown
    }

    pub fn is_in_cooldown(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        now < self.next_eligible_at(cooldown)
    }

    /// Apply another successful verification
    pub fn record_verification(&mut self, verified_at: DateTime<Utc>) {
        self.last_verified_at = verified_at;
        self.verification_count += 1;
    }
}
