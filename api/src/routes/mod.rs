//! Route handlers
//!
//! - `health` - liveness and the API index
//! - `verification` - send and verify one-time codes

pub mod health;
pub mod verification;
