//! Business services containing the verification use cases.

pub mod audit;
pub mod consistency;
pub mod otp;
pub mod phone;
pub mod policy;
pub mod rate_limit;

// Re-export commonly used types
pub use audit::{AuditService, AuditServiceConfig};
pub use consistency::{ConsistencyReport, DeviceSnapshot};
pub use otp::{
    OtpService, OtpServiceConfig, SendOutcome, SendStage, SmsGatewayTrait, VerifyOutcome,
};
pub use phone::{
    IntelligenceServiceConfig, LookupResult, PhoneIntelligenceService, PhoneLookupTrait,
    PhoneNormalizer, PhoneValidation, SmsEligibility,
};
pub use policy::{decide, PolicyDecision, PolicyInput, PolicyWeights};
pub use rate_limit::{
    spawn_counter_cleanup, CounterCleanupConfig, IdentifierStatus, RateLimitReport,
    RateLimitRequest, RateLimiter, RateLimiterConfig,
};
