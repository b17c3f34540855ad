//! Verification record repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::VerificationRecord;
use crate::errors::DomainResult;

/// Persistence contract for OTP records
///
/// Implementations must keep at most one unverified record per phone and
/// must perform the attempt and verified transitions as single atomic,
/// conditional updates. A read followed by a write is not acceptable.
#[async_trait]
pub trait VerificationRecordRepository: Send + Sync {
    /// Delete every unverified record for `record.phone` and insert `record`
    ///
    /// Both steps happen in one transaction so no reader can observe two
    /// pending records for the same phone.
    ///
    /// # Arguments
    /// * `record` - The new pending record
    async fn replace_pending(&self, record: &VerificationRecord) -> DomainResult<()>;

    /// Find the most recent unverified record for a phone
    ///
    /// # Returns
    /// * `Ok(Some(record))` - Latest unverified record, which may be expired or locked
    /// * `Ok(None)` - No unverified record exists
    async fn find_latest_pending(&self, phone: &str) -> DomainResult<Option<VerificationRecord>>;

    /// Atomically consume one verification attempt
    ///
    /// Increments `attempts` only while the record is unverified and
    /// `attempts < max_attempts`.
    ///
    /// # Returns
    /// * `Ok(Some(attempts))` - The attempt count after the increment
    /// * `Ok(None)` - The record is locked, verified or gone; nothing changed
    async fn consume_attempt(&self, id: Uuid, max_attempts: i32) -> DomainResult<Option<i32>>;

    /// Mark a record verified if it is still unverified
    ///
    /// The attempt consumed for the successful guess is refunded so that
    /// `attempts` keeps counting failed guesses only.
    ///
    /// # Returns
    /// * `Ok(true)` - This call performed the transition
    /// * `Ok(false)` - The record was already verified or no longer exists
    async fn mark_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> DomainResult<bool>;
}
