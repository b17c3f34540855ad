//! Audit service module for recording send and verify attempts.

mod service;

pub use service::{AuditService, AuditServiceConfig};
