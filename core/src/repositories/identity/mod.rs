//! User identity repository module.

mod r#trait;
pub use r#trait::UserIdentityRepository;
