//! Verification record repository module.

mod r#trait;
pub use r#trait::VerificationRecordRepository;
