//! # PhoneVerify Core
//!
//! Domain layer for phone ownership verification: entities, the error
//! taxonomy, repository interfaces with an in-memory implementation, and the
//! services that admit, deliver and verify one-time codes.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
