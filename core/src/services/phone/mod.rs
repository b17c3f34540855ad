//! Phone normalization and intelligence validation

pub mod cache;
pub mod normalizer;
pub mod service;
pub mod traits;
pub mod types;

pub use cache::{IntelligenceCache, LookupThrottle};
pub use normalizer::{PhoneNormalizer, DEFAULT_COUNTRY_CODE};
pub use service::{IntelligenceServiceConfig, PhoneIntelligenceService, VERIFIED_RISK_DECREMENT};
pub use traits::PhoneLookupTrait;
pub use types::{
    score_signals, signal_weight, LookupResult, PhoneSignal, PhoneValidation, SmsEligibility,
    ValidationSource, PHONE_RISK_WEIGHTS,
};
