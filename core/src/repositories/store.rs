//! Composite persistence boundary injected into the verification services.

use super::{
    AuditLogRepository, PhoneIntelligenceRepository, RateLimitCounterRepository,
    UserIdentityRepository, VerificationRecordRepository,
};

/// Everything the verification core needs from storage
///
/// Satisfied automatically by any type implementing all five repositories,
/// such as the MySQL store in the infrastructure crate or [`InMemoryStore`].
///
/// [`InMemoryStore`]: super::InMemoryStore
pub trait PersistentStore:
    VerificationRecordRepository
    + RateLimitCounterRepository
    + PhoneIntelligenceRepository
    + UserIdentityRepository
    + AuditLogRepository
{
}

impl<T> PersistentStore for T where
    T: VerificationRecordRepository
        + RateLimitCounterRepository
        + PhoneIntelligenceRepository
        + UserIdentityRepository
        + AuditLogRepository
{
}
