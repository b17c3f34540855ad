//! Tests for the in-memory store's atomicity guarantees

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::InMemoryStore;
use crate::domain::entities::{
    AttemptType, AuditEntry, AuditStatus, IdentifierKind, RateLimitCounter, VerificationRecord,
};
use crate::repositories::{
    AuditLogRepository, RateLimitCounterRepository, UserIdentityRepository,
    VerificationRecordRepository,
};

const PHONE: &str = "+819012345678";

fn record(code: &str) -> VerificationRecord {
    VerificationRecord::new(PHONE, code, Duration::minutes(5))
}

#[tokio::test]
async fn test_replace_pending_keeps_single_unverified_record() {
    let store = InMemoryStore::new();

    store.replace_pending(&record("111111")).await.unwrap();
    store.replace_pending(&record("222222")).await.unwrap();

    assert_eq!(store.pending_count(PHONE), 1);
    let latest = store.find_latest_pending(PHONE).await.unwrap().unwrap();
    assert_eq!(latest.code, "222222");
}

#[tokio::test]
async fn test_replace_pending_preserves_verified_history() {
    let store = InMemoryStore::new();
    let first = record("111111");
    store.replace_pending(&first).await.unwrap();
    assert!(store.mark_verified(first.id, Utc::now()).await.unwrap());

    store.replace_pending(&record("222222")).await.unwrap();

    assert_eq!(store.records_for(PHONE).len(), 2);
    assert_eq!(store.pending_count(PHONE), 1);
}

#[tokio::test]
async fn test_consume_attempt_stops_at_max() {
    let store = InMemoryStore::new();
    let rec = record("123456");
    store.replace_pending(&rec).await.unwrap();

    for expected in 1..=5 {
        assert_eq!(store.consume_attempt(rec.id, 5).await.unwrap(), Some(expected));
    }
    assert_eq!(store.consume_attempt(rec.id, 5).await.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consume_attempt_never_exceeds_max() {
    let store = Arc::new(InMemoryStore::new());
    let rec = record("123456");
    store.replace_pending(&rec).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        let id = rec.id;
        handles.push(tokio::spawn(async move { store.consume_attempt(id, 5).await.unwrap() }));
    }

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            granted += 1;
        }
    }
    assert_eq!(granted, 5);
}

#[tokio::test]
async fn test_mark_verified_is_one_shot_and_refunds_attempt() {
    let store = InMemoryStore::new();
    let rec = record("123456");
    store.replace_pending(&rec).await.unwrap();
    store.consume_attempt(rec.id, 5).await.unwrap();

    assert!(store.mark_verified(rec.id, Utc::now()).await.unwrap());
    assert!(!store.mark_verified(rec.id, Utc::now()).await.unwrap());

    let stored = &store.records_for(PHONE)[0];
    assert!(stored.verified);
    assert_eq!(stored.attempts, 0);
    assert_eq!(store.consume_attempt(rec.id, 5).await.unwrap(), None);
}

#[tokio::test]
async fn test_distinct_counts_exclude_current_identifier() {
    let store = InMemoryStore::new();
    let now = Utc::now();
    let ip = Some("203.0.113.9".to_string());
    store
        .record(&[
            RateLimitCounter::new(IdentifierKind::Ip, "203.0.113.9", "+819000000001", ip.clone(), now),
            RateLimitCounter::new(IdentifierKind::Ip, "203.0.113.9", "+819000000002", ip.clone(), now),
            RateLimitCounter::new(IdentifierKind::Ip, "203.0.113.9", "+819000000002", ip.clone(), now),
        ])
        .await
        .unwrap();

    let since = now - Duration::hours(1);
    assert_eq!(
        store.count_distinct_phones_for_ip("203.0.113.9", since, "+819000000003").await.unwrap(),
        2
    );
    assert_eq!(
        store.count_distinct_phones_for_ip("203.0.113.9", since, "+819000000002").await.unwrap(),
        1
    );
    assert_eq!(store.count_since(IdentifierKind::Ip, "203.0.113.9", since).await.unwrap(), 3);
}

#[tokio::test]
async fn test_prune_removes_only_old_rows() {
    let store = InMemoryStore::new();
    let now = Utc::now();
    store
        .record(&[RateLimitCounter::new(IdentifierKind::Phone, PHONE, PHONE, None, now)])
        .await
        .unwrap();
    store.age_counters(Duration::hours(25));
    store
        .record(&[RateLimitCounter::new(IdentifierKind::Phone, PHONE, PHONE, None, now)])
        .await
        .unwrap();

    let removed = store.prune_older_than(now - Duration::hours(24)).await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(store.counter_rows().len(), 1);
}

#[tokio::test]
async fn test_record_verification_upserts_identity() {
    let store = InMemoryStore::new();

    let first = store.record_verification(PHONE, Utc::now()).await.unwrap();
    let second = store.record_verification(PHONE, Utc::now()).await.unwrap();

    assert_eq!(first.verification_count, 1);
    assert_eq!(second.verification_count, 2);
}

#[tokio::test]
async fn test_failure_injection() {
    let store = InMemoryStore::new();
    store.set_counters_unavailable(true);

    assert!(store.count_since(IdentifierKind::Phone, PHONE, Utc::now()).await.is_err());
    assert!(store.find_latest_pending(PHONE).await.is_ok());

    store.set_should_fail(true);
    let entry = AuditEntry::new(AttemptType::Send, AuditStatus::Success);
    assert!(store.append(&entry).await.is_err());
}
