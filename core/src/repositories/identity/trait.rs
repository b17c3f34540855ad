//! User identity repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::UserIdentity;
use crate::errors::DomainResult;

#[async_trait]
pub trait UserIdentityRepository: Send + Sync {
    async fn find_identity(&self, phone: &str) -> DomainResult<Option<UserIdentity>>;

    /// Upsert after a successful verification
    ///
    /// Creates the identity with a count of one, or sets `last_verified_at`
    /// and increments `verification_count` on an existing one.
    async fn record_verification(
        &self,
        phone: &str,
        verified_at: DateTime<Utc>,
    ) -> DomainResult<UserIdentity>;
}
