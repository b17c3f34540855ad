//! Audit log repository trait defining the interface for audit persistence.

use async_trait::async_trait;

use crate::domain::entities::AuditEntry;
use crate::errors::DomainResult;

/// Append-only audit trail
///
/// Entries are never updated or deleted through this interface.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append an audit entry
    ///
    /// # Arguments
    /// * `entry` - The entry to persist
    async fn append(&self, entry: &AuditEntry) -> DomainResult<()>;

    /// Find entries by phone hash
    ///
    /// # Arguments
    /// * `phone_hash` - The hashed phone number to search for
    /// * `limit` - Maximum number of records to return
    ///
    /// # Returns
    /// * Entries for the phone number, newest first
    async fn find_by_phone_hash(&self, phone_hash: &str, limit: usize) -> DomainResult<Vec<AuditEntry>>;
}
