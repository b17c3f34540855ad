//! Multi-dimensional rate limiting for OTP sends.

mod cleanup;
mod limiter;
mod types;

pub use cleanup::{prune_counters, spawn_counter_cleanup, CounterCleanupConfig};
pub use limiter::{RateLimiter, RateLimiterConfig};
pub use types::{IdentifierStatus, RateLimitReport, RateLimitRequest};

#[cfg(test)]
mod tests;
