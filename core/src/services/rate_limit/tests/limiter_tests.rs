//! Tests for the sliding-window rate limiter

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{IdentifierKind, RateLimitCounter, RiskFlag};
use crate::errors::DomainResult;
use crate::repositories::{InMemoryStore, RateLimitCounterRepository};
use crate::services::rate_limit::{RateLimitRequest, RateLimiter, RateLimiterConfig};

const PHONE: &str = "+819012345678";
const IP: &str = "203.0.113.7";
const FINGERPRINT: &str = "fp-abc123";

fn limiter(config: RateLimiterConfig) -> (RateLimiter<InMemoryStore>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    (RateLimiter::new(store.clone(), config), store)
}

fn phone_n(n: u32) -> String {
    format!("+8190{:08}", n)
}

#[tokio::test]
async fn test_fourth_send_to_phone_is_rejected() {
    let (limiter, store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, Some(IP), Some(FINGERPRINT));

    for _ in 0..3 {
        assert!(limiter.reserve(&request).await.allowed());
    }
    let fourth = limiter.reserve(&request).await;

    assert!(!fourth.allowed());
    assert!(fourth.limit_flags().contains(&RiskFlag::PhoneRateLimit));
    assert_eq!(fourth.status(IdentifierKind::Phone).unwrap().remaining, 0);
    assert!(fourth.status(IdentifierKind::Ip).unwrap().allowed);
    // 3 admitted requests x 3 identifiers
    assert_eq!(store.counter_rows().len(), 9);
}

#[tokio::test]
async fn test_remaining_counts_down() {
    let (limiter, _store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, Some(IP), None);

    let first = limiter.reserve(&request).await;
    let second = limiter.reserve(&request).await;

    assert_eq!(first.status(IdentifierKind::Phone).unwrap().remaining, 2);
    assert_eq!(second.status(IdentifierKind::Phone).unwrap().remaining, 1);
    assert_eq!(second.status(IdentifierKind::Ip).unwrap().remaining, 18);
    assert!(second.status(IdentifierKind::Fingerprint).is_none());
}

#[tokio::test]
async fn test_rejected_request_records_no_identifier() {
    let config = RateLimiterConfig {
        ip_limit: 1,
        ..Default::default()
    };
    let (limiter, store) = limiter(config);

    limiter
        .reserve(&RateLimitRequest::new(&phone_n(1), Some(IP), None))
        .await;
    let rejected = limiter
        .reserve(&RateLimitRequest::new(&phone_n(2), Some(IP), None))
        .await;

    assert!(!rejected.allowed());
    assert!(rejected.limit_flags().contains(&RiskFlag::IpRateLimit));
    assert!(!rejected.limit_flags().contains(&RiskFlag::PhoneRateLimit));
    assert!(store.counter_rows().iter().all(|row| row.phone == phone_n(1)));
}

#[tokio::test]
async fn test_check_alone_does_not_record() {
    let (limiter, store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, Some(IP), None);

    for _ in 0..5 {
        assert!(limiter.check(&request).await.allowed());
    }

    assert!(store.counter_rows().is_empty());
}

#[tokio::test]
async fn test_eleven_distinct_phones_from_one_ip_flags_enumeration() {
    let (limiter, _store) = limiter(RateLimiterConfig::default());

    for n in 1..=10 {
        let report = limiter
            .reserve(&RateLimitRequest::new(&phone_n(n), Some(IP), None))
            .await;
        assert!(report.enumeration_flags.is_empty(), "send {} flagged early", n);
    }
    let eleventh = limiter
        .reserve(&RateLimitRequest::new(&phone_n(11), Some(IP), None))
        .await;

    assert!(eleventh.allowed());
    assert_eq!(eleventh.distinct_phones_for_ip, Some(11));
    assert!(eleventh.enumeration_flags.contains(&RiskFlag::PhoneEnumeration));
    assert!(eleventh.enumeration_flags.contains(&RiskFlag::SuspiciousIp));
    assert!(eleventh.limit_flags().is_empty());
}

#[tokio::test]
async fn test_repeat_phone_does_not_inflate_distinct_count() {
    let (limiter, _store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, Some(IP), None);

    limiter.reserve(&request).await;
    let second = limiter.reserve(&request).await;

    assert_eq!(second.distinct_phones_for_ip, Some(1));
    assert_eq!(second.distinct_ips_for_phone, 1);
}

#[tokio::test]
async fn test_many_ips_for_one_phone_flags_suspicious_phone() {
    let config = RateLimiterConfig {
        phone_limit: 100,
        ..Default::default()
    };
    let (limiter, _store) = limiter(config);

    for n in 1..=5 {
        let ip = format!("198.51.100.{}", n);
        let report = limiter
            .reserve(&RateLimitRequest::new(PHONE, Some(&ip), None))
            .await;
        assert!(report.enumeration_flags.is_empty());
    }
    let sixth = limiter
        .reserve(&RateLimitRequest::new(PHONE, Some("198.51.100.6"), None))
        .await;

    assert_eq!(sixth.distinct_ips_for_phone, 6);
    assert!(sixth.enumeration_flags.contains(&RiskFlag::SuspiciousPhone));
    assert!(sixth.enumeration_flags.contains(&RiskFlag::PhoneEnumeration));
    assert!(!sixth.enumeration_flags.contains(&RiskFlag::SuspiciousIp));
}

#[tokio::test]
async fn test_window_slides() {
    let (limiter, store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, None, None);
    for _ in 0..3 {
        limiter.reserve(&request).await;
    }
    assert!(!limiter.check(&request).await.allowed());

    store.age_counters(Duration::minutes(61));

    assert!(limiter.check(&request).await.allowed());
}

#[tokio::test]
async fn test_store_failure_fails_open() {
    let (limiter, store) = limiter(RateLimiterConfig::default());
    store.set_counters_unavailable(true);

    let report = limiter
        .reserve(&RateLimitRequest::new(PHONE, Some(IP), Some(FINGERPRINT)))
        .await;

    assert!(report.allowed());
    assert!(report.degraded);
    assert!(report.flags().is_empty());
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let config = RateLimiterConfig {
        enabled: false,
        ..Default::default()
    };
    let (limiter, store) = limiter(config);
    let request = RateLimitRequest::new(PHONE, Some(IP), None);

    for _ in 0..10 {
        let report = limiter.reserve(&request).await;
        assert!(report.allowed());
        assert!(!report.degraded);
    }
    assert!(store.counter_rows().is_empty());
}

#[tokio::test]
async fn test_release_drops_reserved_rows() {
    let (limiter, store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, Some(IP), Some(FINGERPRINT));

    let kept = limiter.reserve(&request).await;
    let refused = limiter.reserve(&request).await;
    assert_eq!(refused.reserved.len(), 3);
    assert_eq!(store.counter_rows().len(), 6);

    limiter.release(&refused).await;

    let rows = store.counter_rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| kept.reserved.contains(&row.id)));
    assert_eq!(
        limiter.check(&request).await.status(IdentifierKind::Phone).unwrap().remaining,
        1
    );
}

#[tokio::test]
async fn test_rejected_reservation_holds_no_rows() {
    let (limiter, _store) = limiter(RateLimiterConfig::default());
    let request = RateLimitRequest::new(PHONE, None, None);
    for _ in 0..3 {
        limiter.reserve(&request).await;
    }

    let fourth = limiter.reserve(&request).await;

    assert!(!fourth.allowed());
    assert!(fourth.reserved.is_empty());
}

/// Counter store that yields to the runtime on every call, like a network store
struct SlowCounters(InMemoryStore);

#[async_trait]
impl RateLimitCounterRepository for SlowCounters {
    async fn count_since(
        &self,
        kind: IdentifierKind,
        value: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.0.count_since(kind, value, since).await
    }

    async fn count_distinct_phones_for_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
        exclude_phone: &str,
    ) -> DomainResult<u64> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.0.count_distinct_phones_for_ip(ip, since, exclude_phone).await
    }

    async fn count_distinct_ips_for_phone(
        &self,
        phone: &str,
        since: DateTime<Utc>,
        exclude_ip: &str,
    ) -> DomainResult<u64> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.0.count_distinct_ips_for_phone(phone, since, exclude_ip).await
    }

    async fn record(&self, counters: &[RateLimitCounter]) -> DomainResult<()> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.0.record(counters).await
    }

    async fn release(&self, ids: &[Uuid]) -> DomainResult<()> {
        self.0.release(ids).await
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        self.0.prune_older_than(cutoff).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_burst_stays_within_phone_limit() {
    let store = Arc::new(SlowCounters(InMemoryStore::new()));
    let limiter = Arc::new(RateLimiter::new(store.clone(), RateLimiterConfig::default()));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move {
                limiter
                    .reserve(&RateLimitRequest::new(PHONE, None, None))
                    .await
                    .allowed()
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 3);
    assert_eq!(store.0.counter_rows().len(), 3);
}

#[test]
fn test_blank_identifiers_are_ignored() {
    let request = RateLimitRequest::new(PHONE, Some("  "), Some(""));

    assert_eq!(request.identifiers(), vec![(IdentifierKind::Phone, PHONE)]);
}
