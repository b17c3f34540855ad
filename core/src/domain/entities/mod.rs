//! Domain entities for phone verification.

pub mod audit;
pub mod context;
pub mod identity;
pub mod intelligence;
pub mod rate_limit;
pub mod risk;
pub mod verification_record;

pub use audit::{hash_phone, AttemptType, AuditEntry, AuditStatus};
pub use context::{RequestContext, MAX_CLIENT_ID_LEN, MAX_USER_AGENT_LEN};
pub use identity::UserIdentity;
pub use intelligence::{LineType, PhoneIntelligenceRecord};
pub use rate_limit::{IdentifierKind, RateLimitCounter};
pub use risk::{join_flags, split_flags, RiskFlag, RiskFlags};
pub use verification_record::{
    RecordStatus, VerificationRecord, CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS,
};

#[cfg(test)]
mod tests;
