//! Sliding-window rate limiter over the persistent counter store

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use pv_shared::phone::mask_phone_number;
use pv_shared::RateLimitConfig;

use crate::domain::entities::{IdentifierKind, RateLimitCounter, RiskFlag, RiskFlags};
use crate::errors::DomainResult;
use crate::repositories::RateLimitCounterRepository;

use super::types::{IdentifierStatus, RateLimitReport, RateLimitRequest};

/// Limits applied per window
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    pub enabled: bool,
    pub window: Duration,
    pub phone_limit: u32,
    pub ip_limit: u32,
    pub fingerprint_limit: u32,
    /// Distinct phones one IP may target before enumeration is flagged
    pub max_phones_per_ip: u32,
    /// Distinct IPs one phone may be requested from before enumeration is flagged
    pub max_ips_per_phone: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

impl From<&RateLimitConfig> for RateLimiterConfig {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            window: Duration::seconds(config.window_seconds as i64),
            phone_limit: config.phone_limit,
            ip_limit: config.ip_limit,
            fingerprint_limit: config.fingerprint_limit,
            max_phones_per_ip: config.max_phones_per_ip,
            max_ips_per_phone: config.max_ips_per_phone,
        }
    }
}

impl RateLimiterConfig {
    pub fn limit_for(&self, kind: IdentifierKind) -> u32 {
        match kind {
            IdentifierKind::Phone => self.phone_limit,
            IdentifierKind::Ip => self.ip_limit,
            IdentifierKind::Fingerprint => self.fingerprint_limit,
        }
    }
}

/// Independent per-identifier windows plus cross-identifier enumeration counts
///
/// Store failures never block a request: the limiter fails open, logs a
/// warning and marks the report as degraded.
pub struct RateLimiter<R: RateLimitCounterRepository> {
    repository: Arc<R>,
    config: RateLimiterConfig,
    admission: Mutex<()>,
}

impl<R: RateLimitCounterRepository> RateLimiter<R> {
    pub fn new(repository: Arc<R>, config: RateLimiterConfig) -> Self {
        Self {
            repository,
            config,
            admission: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Evaluate a request without recording it
    pub async fn check(&self, request: &RateLimitRequest<'_>) -> RateLimitReport {
        self.check_at(request, Utc::now()).await
    }

    pub async fn check_at(&self, request: &RateLimitRequest<'_>, now: DateTime<Utc>) -> RateLimitReport {
        if !self.config.enabled {
            return self.unchecked_report(request, now);
        }

        match self.evaluate(request, now).await {
            Ok(report) => {
                if !report.allowed() || !report.enumeration_flags.is_empty() {
                    tracing::warn!(
                        phone = %mask_phone_number(request.phone),
                        ip = request.ip.unwrap_or("-"),
                        flags = ?report.flags(),
                        event = "rate_limit_triggered",
                        "Rate limit or enumeration threshold reached"
                    );
                }
                report
            }
            Err(e) => {
                tracing::warn!(
                    phone = %mask_phone_number(request.phone),
                    error = %e,
                    event = "rate_limit_store_unavailable",
                    "Counter store unavailable, failing open"
                );
                RateLimitReport::fail_open()
            }
        }
    }

    /// Check, then append one counter row per identifier when all are within limits
    ///
    /// Check and append run under one admission lock, so concurrent sends
    /// in this process never pass on the same count. The appended row ids
    /// are returned in `reserved`; a send refused after this point hands
    /// the report to [`RateLimiter::release`].
    pub async fn reserve(&self, request: &RateLimitRequest<'_>) -> RateLimitReport {
        let _admission = self.admission.lock().await;
        let now = Utc::now();
        let mut report = self.check_at(request, now).await;
        if !self.config.enabled || report.degraded || !report.allowed() {
            return report;
        }

        match self.append(request, now).await {
            Some(ids) => report.reserved = ids,
            None => report.degraded = true,
        }
        report
    }

    /// Drop the rows a refused send reserved
    pub async fn release(&self, report: &RateLimitReport) {
        if report.reserved.is_empty() {
            return;
        }
        if let Err(e) = self.repository.release(&report.reserved).await {
            tracing::warn!(
                rows = report.reserved.len(),
                error = %e,
                event = "rate_limit_release_failed",
                "Failed to release reserved rate limit counters"
            );
        }
    }

    async fn append(&self, request: &RateLimitRequest<'_>, now: DateTime<Utc>) -> Option<Vec<Uuid>> {
        let rows: Vec<RateLimitCounter> = request
            .identifiers()
            .into_iter()
            .map(|(kind, value)| {
                RateLimitCounter::new(
                    kind,
                    value,
                    request.phone,
                    request.ip.map(str::to_string),
                    now,
                )
            })
            .collect();

        match self.repository.record(&rows).await {
            Ok(()) => Some(rows.into_iter().map(|row| row.id).collect()),
            Err(e) => {
                tracing::warn!(
                    phone = %mask_phone_number(request.phone),
                    error = %e,
                    event = "rate_limit_record_failed",
                    "Failed to record rate limit counters"
                );
                None
            }
        }
    }

    /// Delete counter rows created before `cutoff`
    pub async fn prune(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        self.repository.prune_older_than(cutoff).await
    }

    async fn evaluate(
        &self,
        request: &RateLimitRequest<'_>,
        now: DateTime<Utc>,
    ) -> DomainResult<RateLimitReport> {
        let since = now - self.config.window;
        let reset_at = now + self.config.window;

        let mut statuses = Vec::new();
        for (kind, value) in request.identifiers() {
            let count = self.repository.count_since(kind, value, since).await?;
            let limit = self.config.limit_for(kind);
            statuses.push(IdentifierStatus {
                kind,
                allowed: count < limit as u64,
                count,
                limit,
                remaining: 0,
                reset_at,
            });
        }
        // Remaining counts only charge this request when it will be recorded
        let admitted = statuses.iter().all(|s| s.allowed);
        for status in statuses.iter_mut() {
            let used = status.count + admitted as u64;
            status.remaining = (status.limit as u64).saturating_sub(used) as u32;
        }

        let mut enumeration_flags = RiskFlags::new();

        let distinct_phones_for_ip = match request.ip {
            Some(ip) => {
                let others = self
                    .repository
                    .count_distinct_phones_for_ip(ip, since, request.phone)
                    .await?;
                let distinct = others + 1;
                if distinct > self.config.max_phones_per_ip as u64 {
                    enumeration_flags.insert(RiskFlag::PhoneEnumeration);
                    enumeration_flags.insert(RiskFlag::SuspiciousIp);
                }
                Some(distinct)
            }
            None => None,
        };

        let other_ips = self
            .repository
            .count_distinct_ips_for_phone(request.phone, since, request.ip.unwrap_or(""))
            .await?;
        let distinct_ips_for_phone = other_ips + request.ip.is_some() as u64;
        if distinct_ips_for_phone > self.config.max_ips_per_phone as u64 {
            enumeration_flags.insert(RiskFlag::PhoneEnumeration);
            enumeration_flags.insert(RiskFlag::SuspiciousPhone);
        }

        Ok(RateLimitReport {
            statuses,
            enumeration_flags,
            distinct_phones_for_ip,
            distinct_ips_for_phone,
            degraded: false,
            reserved: Vec::new(),
        })
    }

    fn unchecked_report(&self, request: &RateLimitRequest<'_>, now: DateTime<Utc>) -> RateLimitReport {
        let statuses = request
            .identifiers()
            .into_iter()
            .map(|(kind, _)| {
                let limit = self.config.limit_for(kind);
                IdentifierStatus {
                    kind,
                    allowed: true,
                    count: 0,
                    limit,
                    remaining: limit,
                    reset_at: now + self.config.window,
                }
            })
            .collect();
        RateLimitReport {
            statuses,
            ..Default::default()
        }
    }
}
