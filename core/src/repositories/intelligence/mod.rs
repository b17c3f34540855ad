//! Phone intelligence repository module.

mod r#trait;
pub use r#trait::PhoneIntelligenceRepository;
