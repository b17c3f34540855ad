//! Phone intelligence repository trait.

use async_trait::async_trait;

use crate::domain::entities::PhoneIntelligenceRecord;
use crate::errors::DomainResult;

/// Cross-process cache of lookup results
#[async_trait]
pub trait PhoneIntelligenceRepository: Send + Sync {
    async fn find_intelligence(&self, phone: &str) -> DomainResult<Option<PhoneIntelligenceRecord>>;

    /// Insert or replace the record for `record.phone`
    async fn upsert_intelligence(&self, record: &PhoneIntelligenceRecord) -> DomainResult<()>;

    /// Lower the stored risk score by `amount`, floored at zero, and stamp
    /// `last_verification`
    ///
    /// # Returns
    /// * `Ok(Some(score))` - The new score
    /// * `Ok(None)` - No record exists for the phone
    async fn decrement_risk_score(&self, phone: &str, amount: u8) -> DomainResult<Option<u8>>;
}
