//! Trait for the external phone intelligence provider

use async_trait::async_trait;
use std::sync::Arc;

use super::types::LookupResult;

/// Carrier lookup integration
///
/// Implementations may be slow or fail; callers wrap every call in a timeout.
#[async_trait]
pub trait PhoneLookupTrait: Send + Sync {
    /// Look up carrier data for a normalized E.164 number
    async fn lookup(&self, phone: &str) -> Result<LookupResult, String>;
}

#[async_trait]
impl<T: PhoneLookupTrait + ?Sized> PhoneLookupTrait for Box<T> {
    async fn lookup(&self, phone: &str) -> Result<LookupResult, String> {
        (**self).lookup(phone).await
    }
}

#[async_trait]
impl<T: PhoneLookupTrait + ?Sized> PhoneLookupTrait for Arc<T> {
    async fn lookup(&self, phone: &str) -> Result<LookupResult, String> {
        (**self).lookup(phone).await
    }
}
