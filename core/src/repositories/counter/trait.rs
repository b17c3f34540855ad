//! Rate-limit counter repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{IdentifierKind, RateLimitCounter};
use crate::errors::DomainResult;

#[async_trait]
pub trait RateLimitCounterRepository: Send + Sync {
    /// Count rows for one identifier created at or after `since`
    async fn count_since(
        &self,
        kind: IdentifierKind,
        value: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64>;

    /// Distinct phones recorded against `ip` since `since`, not counting `exclude_phone`
    async fn count_distinct_phones_for_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
        exclude_phone: &str,
    ) -> DomainResult<u64>;

    /// Distinct IPs recorded against `phone` since `since`, not counting `exclude_ip`
    async fn count_distinct_ips_for_phone(
        &self,
        phone: &str,
        since: DateTime<Utc>,
        exclude_ip: &str,
    ) -> DomainResult<u64>;

    /// Append counter rows for an admitted request
    async fn record(&self, counters: &[RateLimitCounter]) -> DomainResult<()>;

    /// Delete rows by id, for a request refused after its rows were appended
    async fn release(&self, ids: &[Uuid]) -> DomainResult<()>;

    /// Delete rows created before `cutoff`, returning how many were removed
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> DomainResult<u64>;
}
