//! MySQL implementation of the RateLimitCounterRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pv_core::domain::entities::{IdentifierKind, RateLimitCounter};
use pv_core::errors::DomainResult;
use pv_core::repositories::RateLimitCounterRepository;

use super::{db_error, MySqlStore};

#[async_trait]
impl RateLimitCounterRepository for MySqlStore {
    async fn count_since(
        &self,
        kind: IdentifierKind,
        value: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rate_limit_counters
            WHERE identifier_type = ? AND identifier_value = ? AND created_at >= ?
            "#,
        )
        .bind(kind.as_str())
        .bind(value)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count rate limit rows", e))?;

        Ok(count.max(0) as u64)
    }

    async fn count_distinct_phones_for_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
        exclude_phone: &str,
    ) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT phone) FROM rate_limit_counters
            WHERE identifier_type = 'ip' AND identifier_value = ?
              AND created_at >= ? AND phone <> ?
            "#,
        )
        .bind(ip)
        .bind(since)
        .bind(exclude_phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count distinct phones for ip", e))?;

        Ok(count.max(0) as u64)
    }

    async fn count_distinct_ips_for_phone(
        &self,
        phone: &str,
        since: DateTime<Utc>,
        exclude_ip: &str,
    ) -> DomainResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT ip) FROM rate_limit_counters
            WHERE identifier_type = 'phone' AND identifier_value = ?
              AND created_at >= ? AND ip IS NOT NULL AND ip <> ?
            "#,
        )
        .bind(phone)
        .bind(since)
        .bind(exclude_ip)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count distinct ips for phone", e))?;

        Ok(count.max(0) as u64)
    }

    async fn record(&self, counters: &[RateLimitCounter]) -> DomainResult<()> {
        if counters.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin counter transaction", e))?;

        for counter in counters {
            sqlx::query(
                r#"
                INSERT INTO rate_limit_counters (
                    id, identifier_type, identifier_value, phone, ip, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(counter.id.to_string())
            .bind(counter.kind.as_str())
            .bind(&counter.value)
            .bind(&counter.phone)
            .bind(&counter.ip)
            .bind(counter.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("record rate limit row", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit rate limit rows", e))
    }

    async fn release(&self, ids: &[Uuid]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin counter release", e))?;

        for id in ids {
            sqlx::query("DELETE FROM rate_limit_counters WHERE id = ?")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("release rate limit row", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit counter release", e))
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM rate_limit_counters WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("prune rate limit rows", e))?;

        Ok(result.rows_affected())
    }
}
