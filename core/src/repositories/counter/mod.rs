//! Rate-limit counter repository module.

mod r#trait;
pub use r#trait::RateLimitCounterRepository;
