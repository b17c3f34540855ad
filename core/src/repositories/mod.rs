pub mod audit;
pub mod counter;
pub mod identity;
pub mod intelligence;
pub mod memory;
pub mod store;
pub mod verification;

pub use audit::AuditLogRepository;
pub use counter::RateLimitCounterRepository;
pub use identity::UserIdentityRepository;
pub use intelligence::PhoneIntelligenceRepository;
pub use memory::InMemoryStore;
pub use store::PersistentStore;
pub use verification::VerificationRecordRepository;
